/// Change notification for GridView
///
/// An `Emitter<T>` is an ordered list of listeners. `fire` invokes every
/// listener synchronously on the calling thread, in subscription order,
/// before returning. There is no queueing and no deduplication: firing the
/// same payload twice calls every listener twice.
///
/// # Examples
///
/// ```
/// use gridview::Emitter;
/// use std::cell::Cell;
/// use std::rc::Rc;
///
/// let seen = Rc::new(Cell::new(0));
/// let mut emitter = Emitter::<usize>::new();
///
/// let sink = seen.clone();
/// let id = emitter.subscribe(move |count| sink.set(*count));
///
/// emitter.fire(&42);
/// assert_eq!(seen.get(), 42);
///
/// assert!(emitter.unsubscribe(id));
/// emitter.fire(&7);
/// assert_eq!(seen.get(), 42);
/// ```

use std::fmt;

/// Handle returned by `subscribe`, used to unsubscribe later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

pub struct Emitter<T> {
    listeners: Vec<(ListenerId, Box<dyn FnMut(&T)>)>,
    next_id: u64,
}

impl<T> Emitter<T> {
    pub fn new() -> Self {
        Emitter {
            listeners: Vec::new(),
            next_id: 0,
        }
    }

    /// Register a listener. It stays registered until `unsubscribe`.
    pub fn subscribe<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&T) + 'static,
    {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener. Returns false if the id was not registered.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        match self.listeners.iter().position(|(lid, _)| *lid == id) {
            Some(pos) => {
                self.listeners.remove(pos);
                true
            }
            None => false,
        }
    }

    pub fn fire(&mut self, payload: &T) {
        for (_, listener) in self.listeners.iter_mut() {
            listener(payload);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn has_listeners(&self) -> bool {
        !self.listeners.is_empty()
    }
}

impl<T> Default for Emitter<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Emitter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Emitter")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_listeners_fire_in_subscription_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut emitter = Emitter::<&'static str>::new();

        let a = log.clone();
        emitter.subscribe(move |p| a.borrow_mut().push(format!("first:{}", p)));
        let b = log.clone();
        emitter.subscribe(move |p| b.borrow_mut().push(format!("second:{}", p)));

        emitter.fire(&"x");
        assert_eq!(*log.borrow(), vec!["first:x", "second:x"]);
    }

    #[test]
    fn test_redundant_fires_are_delivered() {
        let count = Rc::new(RefCell::new(0));
        let mut emitter = Emitter::<()>::new();
        let c = count.clone();
        emitter.subscribe(move |_| *c.borrow_mut() += 1);

        emitter.fire(&());
        emitter.fire(&());
        assert_eq!(*count.borrow(), 2);
    }

    #[test]
    fn test_unsubscribe() {
        let mut emitter = Emitter::<u32>::new();
        let id1 = emitter.subscribe(|_| {});
        let id2 = emitter.subscribe(|_| {});
        assert_ne!(id1, id2);
        assert_eq!(emitter.listener_count(), 2);

        assert!(emitter.unsubscribe(id1));
        assert!(!emitter.unsubscribe(id1));
        assert_eq!(emitter.listener_count(), 1);

        assert!(emitter.unsubscribe(id2));
        assert!(!emitter.has_listeners());
    }
}
