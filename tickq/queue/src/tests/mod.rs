use std::cell::RefCell;


thread_local! {
    static RAN: RefCell<Vec<u8>> = const { RefCell::new(Vec::new()) };
}

/// Records the first parameter byte of every task that runs on this thread.
pub(crate) fn record(params: &[u8]) {
    RAN.with(|ran| ran.borrow_mut().push(params.first().copied().unwrap_or(0)));
}

pub(crate) fn take_ran() -> Vec<u8> {
    RAN.with(|ran| std::mem::take(&mut *ran.borrow_mut()))
}
