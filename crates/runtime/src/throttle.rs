//! Leading/trailing-edge rate limiting.
//!
//! A [`Throttle`] lets at most one invocation through per `wait_ms` window.
//! The first call in a quiet period runs immediately (leading edge); calls
//! inside the window are coalesced into a single trailing invocation that
//! runs with the most recent arguments once the window closes.
//!
//! The trailing deadline is owned by the throttle itself. Callers poll it
//! with host time (or arm a timer at [`Throttle::next_deadline`]), so no
//! timer outlives the instance.

use foundation::time::Millis;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ThrottleOptions {
    /// Run on the first call of a window.
    pub leading: bool,
    /// Run once more after the window with the latest arguments.
    pub trailing: bool,
}

impl Default for ThrottleOptions {
    fn default() -> Self {
        Self {
            leading: true,
            trailing: true,
        }
    }
}

#[derive(Debug)]
pub struct Throttle<A> {
    wait_ms: u64,
    options: ThrottleOptions,
    previous: Option<Millis>,
    trailing_due: Option<Millis>,
    args: Option<A>,
}

impl<A> Throttle<A> {
    pub fn new(wait_ms: u64) -> Self {
        Self::with_options(wait_ms, ThrottleOptions::default())
    }

    pub fn with_options(wait_ms: u64, options: ThrottleOptions) -> Self {
        Self {
            wait_ms,
            options,
            previous: None,
            trailing_due: None,
            args: None,
        }
    }

    pub fn wait_ms(&self) -> u64 {
        self.wait_ms
    }

    /// Deadline of the pending trailing invocation, if one is armed.
    pub fn next_deadline(&self) -> Option<Millis> {
        self.trailing_due
    }

    /// Offers a call at `now`.
    ///
    /// Returns the arguments to run with immediately, or `None` when the
    /// call was absorbed (possibly arming the trailing edge).
    pub fn call(&mut self, now: Millis, args: A) -> Option<A> {
        let previous = match self.previous {
            Some(previous) => Some(previous),
            None if !self.options.leading => {
                self.previous = Some(now);
                Some(now)
            }
            None => None,
        };
        self.args = Some(args);

        let remaining = previous.map(|previous| {
            self.wait_ms as i128 - (now.as_u64() as i128 - previous.as_u64() as i128)
        });

        match remaining {
            // Window elapsed, never ran, or the clock went backwards.
            None => self.run_now(now),
            Some(r) if r <= 0 || r > self.wait_ms as i128 => self.run_now(now),
            Some(r) => {
                if self.trailing_due.is_none() && self.options.trailing {
                    self.trailing_due = Some(now.saturating_add(r as u64));
                }
                None
            }
        }
    }

    fn run_now(&mut self, now: Millis) -> Option<A> {
        self.trailing_due = None;
        self.previous = Some(now);
        self.args.take()
    }

    /// Fires the trailing invocation if its deadline has passed.
    pub fn poll(&mut self, now: Millis) -> Option<A> {
        let due = self.trailing_due?;
        if now < due {
            return None;
        }
        self.previous = if self.options.leading { Some(now) } else { None };
        self.trailing_due = None;
        tracing::trace!(%now, "throttle trailing edge");
        self.args.take()
    }

    /// Drops any pending trailing invocation and forgets the last window.
    pub fn cancel(&mut self) {
        self.previous = None;
        self.trailing_due = None;
        self.args = None;
    }
}

/// A callback wrapped by a [`Throttle`].
pub struct Throttled<A, F> {
    throttle: Throttle<A>,
    func: F,
}

impl<A, R, F> Throttled<A, F>
where
    F: FnMut(A) -> R,
{
    pub fn new(wait_ms: u64, func: F) -> Self {
        Self::with_options(wait_ms, ThrottleOptions::default(), func)
    }

    pub fn with_options(wait_ms: u64, options: ThrottleOptions, func: F) -> Self {
        Self {
            throttle: Throttle::with_options(wait_ms, options),
            func,
        }
    }

    /// Calls through when the throttle allows it; returns the callback result.
    pub fn call(&mut self, now: Millis, args: A) -> Option<R> {
        self.throttle.call(now, args).map(&mut self.func)
    }

    pub fn poll(&mut self, now: Millis) -> Option<R> {
        self.throttle.poll(now).map(&mut self.func)
    }

    pub fn next_deadline(&self) -> Option<Millis> {
        self.throttle.next_deadline()
    }

    pub fn cancel(&mut self) {
        self.throttle.cancel();
    }
}
