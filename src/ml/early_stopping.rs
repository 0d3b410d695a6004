// ============================================================
// Layer 5 - Early Stopping on Validation Accuracy
// ============================================================
// Tracks the best validation accuracy seen so far and decides,
// after every epoch, whether to checkpoint, keep going, or stop.
//
//   - Improvement means strictly greater accuracy than the best
//   - Every improvement rewrites the artifact (best-only checkpoint)
//   - After `patience` epochs without improvement, the next stale
//     epoch stops training; patience 0 stops at the first one
//
// The trainer restores the best weights when it stops, so the
// saved artifact and the returned model can come from an earlier
// epoch than the one where training halted.

/// What the trainer should do after an epoch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EpochDecision {
    /// New best: checkpoint and continue
    Improved,
    /// No improvement, still within patience
    Continue,
    /// No improvement and patience exhausted
    Stop,
}

#[derive(Debug, Clone)]
pub struct EarlyStopping {
    patience:     usize,
    best:         Option<f64>,
    best_epoch:   usize,
    stale_epochs: usize,
}

impl EarlyStopping {
    pub fn new(patience: usize) -> Self {
        Self { patience, best: None, best_epoch: 0, stale_epochs: 0 }
    }

    /// Record the validation accuracy of `epoch` (1-based).
    pub fn observe(&mut self, epoch: usize, val_accuracy: f64) -> EpochDecision {
        let improved = match self.best {
            None       => true,
            Some(best) => val_accuracy > best,
        };

        if improved {
            self.best         = Some(val_accuracy);
            self.best_epoch   = epoch;
            self.stale_epochs = 0;
            return EpochDecision::Improved;
        }

        self.stale_epochs += 1;
        if self.stale_epochs > self.patience {
            EpochDecision::Stop
        } else {
            EpochDecision::Continue
        }
    }

    pub fn best_accuracy(&self) -> Option<f64> {
        self.best
    }

    pub fn best_epoch(&self) -> usize {
        self.best_epoch
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_epoch_always_improves() {
        let mut es = EarlyStopping::new(0);
        assert_eq!(es.observe(1, 0.0), EpochDecision::Improved);
        assert_eq!(es.best_epoch(), 1);
    }

    #[test]
    fn test_zero_patience_stops_on_first_stale_epoch() {
        let mut es = EarlyStopping::new(0);
        assert_eq!(es.observe(1, 0.60), EpochDecision::Improved);
        assert_eq!(es.observe(2, 0.70), EpochDecision::Improved);
        // equal is not an improvement
        assert_eq!(es.observe(3, 0.70), EpochDecision::Stop);
        assert_eq!(es.best_epoch(), 2);
        assert_eq!(es.best_accuracy(), Some(0.70));
    }

    #[test]
    fn test_patience_tolerates_stale_epochs() {
        let mut es = EarlyStopping::new(2);
        assert_eq!(es.observe(1, 0.5), EpochDecision::Improved);
        assert_eq!(es.observe(2, 0.4), EpochDecision::Continue);
        assert_eq!(es.observe(3, 0.5), EpochDecision::Continue);
        assert_eq!(es.observe(4, 0.6), EpochDecision::Improved);
        assert_eq!(es.observe(5, 0.1), EpochDecision::Continue);
        assert_eq!(es.observe(6, 0.1), EpochDecision::Continue);
        assert_eq!(es.observe(7, 0.1), EpochDecision::Stop);
        assert_eq!(es.best_epoch(), 4);
    }
}
