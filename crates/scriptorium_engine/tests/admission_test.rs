use scriptorium_engine::AdmissionController;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[test]
fn limit_stays_between_one_and_ceiling() {
    let admission = AdmissionController::new(2, 3);
    admission.widen(5);
    assert_eq!(admission.limit(), 3);
    admission.narrow(10);
    assert_eq!(admission.limit(), 1);

    let clamped = AdmissionController::new(0, 2);
    assert_eq!(clamped.limit(), 1);
}

#[tokio::test]
async fn narrowing_does_not_preempt_running_slots() {
    let admission = AdmissionController::new(2, 2);
    let first = admission.try_acquire().unwrap();
    let second = admission.try_acquire().unwrap();
    admission.narrow(1);
    assert_eq!(admission.running(), 2);

    drop(first);
    assert!(admission.try_acquire().is_none());
    drop(second);
    assert!(admission.try_acquire().is_some());
}

#[tokio::test]
async fn waiter_is_admitted_when_a_slot_frees() {
    let admission = AdmissionController::new(1, 1);
    let held = admission.try_acquire().unwrap();

    let waiter = {
        let admission = admission.clone();
        tokio::spawn(async move {
            let cancel = CancellationToken::new();
            admission.acquire(&cancel).await.is_some()
        })
    };
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(!waiter.is_finished());

    drop(held);
    assert!(waiter.await.unwrap());
}

#[tokio::test]
async fn cancellation_abandons_the_wait() {
    let admission = AdmissionController::new(1, 1);
    let _held = admission.try_acquire().unwrap();
    let cancel = CancellationToken::new();

    let waiter = {
        let admission = admission.clone();
        let cancel = cancel.clone();
        tokio::spawn(async move { admission.acquire(&cancel).await.is_none() })
    };
    cancel.cancel();
    assert!(waiter.await.unwrap());
    assert_eq!(admission.running(), 1);
}
