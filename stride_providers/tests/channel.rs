use std::thread;
use std::time::Duration;

use stride_providers::{ProviderError, channel};
use stride_traits::{LocationProvider, RawFix};

fn fix(ts: i64) -> RawFix {
    RawFix {
        source: "gps".into(),
        captured_ms: ts,
        latitude: 1.0,
        longitude: 2.0,
        altitude: 0.0,
        speed: 0.0,
        horizontal_accuracy: Some(3.0),
        vertical_accuracy: None,
        speed_accuracy: None,
    }
}

#[test]
fn delivers_fixes_from_another_thread() {
    let (tx, mut rx) = channel(4);
    let h = thread::spawn(move || {
        for ts in 0..3 {
            tx.send(fix(ts)).unwrap();
        }
    });
    h.join().unwrap();

    let got: Vec<i64> = (0..3)
        .map(|_| {
            rx.next_fix(Duration::from_millis(50))
                .unwrap()
                .unwrap()
                .captured_ms
        })
        .collect();
    assert_eq!(got, vec![0, 1, 2]);
    // Sender dropped and buffer drained.
    assert!(rx.next_fix(Duration::from_millis(5)).unwrap().is_none());
}

#[test]
fn empty_channel_times_out() {
    let (_tx, mut rx) = channel(1);
    let err = rx.next_fix(Duration::from_millis(5)).unwrap_err();
    assert!(err.to_string().to_lowercase().contains("timeout"));
    assert!(matches!(
        err.downcast_ref::<ProviderError>(),
        Some(ProviderError::Timeout)
    ));
}

#[test]
fn try_send_drops_when_full_and_fails_when_closed() {
    let (tx, rx) = channel(1);
    assert!(tx.try_send(fix(0)).unwrap());
    assert!(!tx.try_send(fix(1)).unwrap());
    drop(rx);
    assert!(matches!(tx.send(fix(2)), Err(ProviderError::Closed)));
}
