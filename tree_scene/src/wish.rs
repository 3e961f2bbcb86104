//! The wish overlay: a random greeting shown on demand.

use rand::Rng;
use tracing::debug;

#[derive(Clone, Debug, Default)]
pub struct WishState {
    messages: Vec<String>,
    active:   bool,
    shown:    Option<usize>,
    last:     Option<usize>,
}

impl WishState {
    pub fn new(messages: Vec<String>) -> Self {
        WishState { messages, active: false, shown: None, last: None }
    }

    /// Whether the wish is on.  Stays true with no message to show when the
    /// message list is empty.
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn message(&self) -> Option<&str> {
        self.shown.and_then(|i| self.messages.get(i)).map(String::as_str)
    }

    /// Hide the wish if shown; otherwise show a random message that differs
    /// from the previous one whenever there is a choice.
    pub fn toggle<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<&str> {
        if self.active {
            self.active = false;
            self.shown  = None;
            debug!("wish hidden");
            return None;
        }
        self.active = true;
        let n = self.messages.len();
        if n == 0 {
            debug!("wish on, no messages configured");
            return None;
        }
        let pick = match self.last {
            // Draw from the other n-1 slots and skip over the previous one.
            Some(prev) if n > 1 => {
                let i = rng.gen_range(0..n - 1);
                if i >= prev { i + 1 } else { i }
            }
            _ => rng.gen_range(0..n),
        };
        self.shown = Some(pick);
        self.last  = Some(pick);
        debug!(index = pick, "wish shown");
        self.message()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn wishes(n: usize) -> WishState {
        WishState::new((0..n).map(|i| format!("wish {}", i)).collect())
    }

    #[test]
    fn toggle_shows_then_hides() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut w = wishes(3);
        assert!(w.toggle(&mut rng).is_some());
        assert!(w.is_active());
        assert!(w.toggle(&mut rng).is_none());
        assert!(!w.is_active());
    }

    #[test]
    fn never_repeats_previous_message() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut w = wishes(2);
        let mut prev = w.toggle(&mut rng).map(str::to_owned);
        for _ in 0..50 {
            w.toggle(&mut rng);
            let next = w.toggle(&mut rng).map(str::to_owned);
            assert_ne!(next, prev);
            prev = next;
        }
    }

    #[test]
    fn single_message_repeats() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut w = wishes(1);
        assert_eq!(w.toggle(&mut rng), Some("wish 0"));
        w.toggle(&mut rng);
        assert_eq!(w.toggle(&mut rng), Some("wish 0"));
    }

    #[test]
    fn no_messages_still_toggles() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut w = wishes(0);
        assert_eq!(w.toggle(&mut rng), None);
        assert!(w.is_active());
        assert_eq!(w.message(), None);
        w.toggle(&mut rng);
        assert!(!w.is_active());
    }
}
