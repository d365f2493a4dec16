#![warn(clippy::all, rust_2018_idioms)]

pub mod backend;
pub mod event;
pub mod frontend;
pub mod string_error;

/// Sending on the request channel only fails once the backend thread has
/// stopped, which must not happen while the UI is alive.
pub const BACKEND_HUNG_UP_MSG: &str = "backend event loop hung up";

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use env_logger;
    use log::trace;

    use crate::backend::{request_stop, BackendEventLoop, BackendLink, BackendState};

    struct TestState {
        handled: usize,
    }
    impl BackendState for TestState {}

    #[test]
    fn test_cancel_request_working() {
        let _ = env_logger::builder().is_test(true).try_init();

        let (request_tx, request_rx) = std::sync::mpsc::channel();
        let backend_state = TestState { handled: 0 };
        let eventloop_handle = BackendEventLoop::new(request_rx, backend_state).run();

        let tic = Instant::now();

        let (rx, linker) = BackendLink::new("slow request", |_: &mut BackendEventLoop<TestState>| {
            std::thread::sleep(std::time::Duration::from_millis(1000));
        });

        // Dropping rx cancels the request, so the backend never sleeps.
        drop(rx);
        trace!("drop of receiver done");
        assert!(linker.is_cancelled());
        request_tx.send(Box::new(linker)).unwrap();
        // Joins the backend thread, so this blocks for as long as the
        // action would take if it was not skipped.
        request_stop(&request_tx, eventloop_handle);
        let delta_time = (Instant::now() - tic).as_millis();
        assert!(delta_time < 500);
    }

    #[test]
    fn test_requests_run_in_order() {
        let _ = env_logger::builder().is_test(true).try_init();

        let (request_tx, request_rx) = std::sync::mpsc::channel();
        let eventloop_handle = BackendEventLoop::new(request_rx, TestState { handled: 0 }).run();

        let receivers: Vec<_> = (0..3)
            .map(|_| {
                let (rx, linker) =
                    BackendLink::new("count", |b: &mut BackendEventLoop<TestState>| {
                        b.state.handled += 1;
                        b.state.handled
                    });
                request_tx.send(Box::new(linker)).unwrap();
                rx
            })
            .collect();

        let answers: Vec<usize> = receivers
            .iter()
            .map(|rx| rx.recv_timeout(std::time::Duration::from_secs(5)).unwrap())
            .collect();
        assert_eq!(answers, vec![1, 2, 3]);
        request_stop(&request_tx, eventloop_handle);
    }
}
