//! SharedWindow - a window handed between one filler and many readers.

use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::window::Window;

/// A cloneable handle to a window behind a reader-writer lock.
///
/// The thread driving a fill holds the write guard for the duration of the
/// fill. Once it is released, any number of readers can hold read guards at
/// the same time; the contents do not change between fills.
#[derive(Clone)]
pub struct SharedWindow {
    inner: Arc<RwLock<Window>>,
}

impl SharedWindow {
    pub fn new(window: Window) -> Self {
        Self {
            inner: Arc::new(RwLock::new(window)),
        }
    }

    /// Acquire a read guard.
    #[inline]
    pub fn read(&self) -> RwLockReadGuard<'_, Window> {
        self.inner.read()
    }

    /// Acquire the write guard, e.g. to refill.
    #[inline]
    pub fn write(&self) -> RwLockWriteGuard<'_, Window> {
        self.inner.write()
    }

    /// Take the window back if this is the last handle.
    pub fn try_unwrap(self) -> Result<Window, Self> {
        Arc::try_unwrap(self.inner)
            .map(RwLock::into_inner)
            .map_err(|inner| Self { inner })
    }
}

impl From<Window> for SharedWindow {
    fn from(window: Window) -> Self {
        Self::new(window)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn filled(rows: i64) -> Window {
        let mut w = Window::create("shared", 64 * 1024).unwrap();
        w.set_num_columns(1).unwrap();
        for i in 0..rows {
            let row = w.alloc_row().unwrap();
            w.put_long(row, 0, i * 10).unwrap();
        }
        w
    }

    #[test]
    fn test_shared_concurrent_reads() {
        let shared = SharedWindow::new(filled(50));
        let mut handles = vec![];

        for t in 0..10 {
            let shared_clone = shared.clone();
            handles.push(thread::spawn(move || {
                let window = shared_clone.read();
                let row = t * 5;
                assert_eq!(window.get_long(row, 0).unwrap(), row as i64 * 10);
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }
    }

    #[test]
    fn test_shared_write_then_read() {
        let shared = SharedWindow::new(filled(1));
        {
            let mut window = shared.write();
            window.clear().unwrap();
            window.set_num_columns(1).unwrap();
            window.alloc_row().unwrap();
            window.put_string(0, 0, "refilled").unwrap();
        }

        assert_eq!(shared.read().get_string(0, 0).unwrap(), "refilled");
    }

    #[test]
    fn test_try_unwrap() {
        let shared = SharedWindow::new(filled(2));
        let other = shared.clone();

        let shared = shared.try_unwrap().unwrap_err();
        drop(other);

        let window = shared.try_unwrap().ok().unwrap();
        assert_eq!(window.num_rows(), 2);
    }
}
