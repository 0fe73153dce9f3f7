// Evaluation Metrics
// Accuracy, confusion matrix and per-class precision/recall/F1 for the
// held-out split.

use crate::models::Label;
use serde::{Deserialize, Serialize};
use std::fmt;

const N_CLASSES: usize = Label::ALL.len();

pub fn accuracy(y_true: &[Label], y_pred: &[Label]) -> f64 {
    if y_true.is_empty() {
        return 0.0;
    }
    let correct = y_true.iter().zip(y_pred).filter(|(t, p)| t == p).count();
    correct as f64 / y_true.len() as f64
}

fn safe_div(num: f64, den: f64) -> f64 {
    if den > 0.0 {
        num / den
    } else {
        0.0
    }
}

// ============ Confusion Matrix ============

/// Rows are true labels, columns are predicted labels
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    pub counts: [[usize; N_CLASSES]; N_CLASSES],
}

impl ConfusionMatrix {
    pub fn from_predictions(y_true: &[Label], y_pred: &[Label]) -> Self {
        let mut counts = [[0; N_CLASSES]; N_CLASSES];
        for (t, p) in y_true.iter().zip(y_pred) {
            counts[t.index()][p.index()] += 1;
        }
        Self { counts }
    }

    pub fn get(&self, truth: Label, predicted: Label) -> usize {
        self.counts[truth.index()][predicted.index()]
    }

    pub fn total(&self) -> usize {
        self.counts.iter().flatten().sum()
    }
}

impl fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use crate::models::Label::{Ai, Human};
        writeln!(f, "Confusion Matrix:")?;
        writeln!(f, "           Pred Human  Pred AI")?;
        writeln!(
            f,
            "True Human    {:<8}    {:<8}",
            self.get(Human, Human),
            self.get(Human, Ai)
        )?;
        write!(
            f,
            "True AI       {:<8}    {:<8}",
            self.get(Ai, Human),
            self.get(Ai, Ai)
        )
    }
}

// ============ Classification Report ============

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationReport {
    pub classes: Vec<(Label, ClassMetrics)>,
    pub accuracy: f64,
    pub macro_avg: ClassMetrics,
    pub weighted_avg: ClassMetrics,
}

impl ClassificationReport {
    pub fn from_confusion(cm: &ConfusionMatrix) -> Self {
        let total = cm.total();
        let classes: Vec<(Label, ClassMetrics)> = Label::ALL
            .iter()
            .map(|&label| {
                let tp = cm.get(label, label) as f64;
                let predicted: usize = Label::ALL.iter().map(|&t| cm.get(t, label)).sum();
                let support: usize = Label::ALL.iter().map(|&p| cm.get(label, p)).sum();
                let precision = safe_div(tp, predicted as f64);
                let recall = safe_div(tp, support as f64);
                let f1 = safe_div(2.0 * precision * recall, precision + recall);
                (
                    label,
                    ClassMetrics {
                        precision,
                        recall,
                        f1,
                        support,
                    },
                )
            })
            .collect();

        let n = classes.len() as f64;
        let macro_avg = ClassMetrics {
            precision: classes.iter().map(|(_, m)| m.precision).sum::<f64>() / n,
            recall: classes.iter().map(|(_, m)| m.recall).sum::<f64>() / n,
            f1: classes.iter().map(|(_, m)| m.f1).sum::<f64>() / n,
            support: total,
        };

        let weight = |m: &ClassMetrics| safe_div(m.support as f64, total as f64);
        let weighted_avg = ClassMetrics {
            precision: classes.iter().map(|(_, m)| m.precision * weight(m)).sum(),
            recall: classes.iter().map(|(_, m)| m.recall * weight(m)).sum(),
            f1: classes.iter().map(|(_, m)| m.f1 * weight(m)).sum(),
            support: total,
        };

        let correct: usize = Label::ALL.iter().map(|&l| cm.get(l, l)).sum();
        Self {
            classes,
            accuracy: safe_div(correct as f64, total as f64),
            macro_avg,
            weighted_avg,
        }
    }

    pub fn class(&self, label: Label) -> Option<&ClassMetrics> {
        self.classes.iter().find(|(l, _)| *l == label).map(|(_, m)| m)
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const W: usize = 12;
        let row = |f: &mut fmt::Formatter<'_>, name: &str, m: &ClassMetrics| {
            writeln!(
                f,
                "{:>W$} {:>9.2} {:>9.2} {:>9.2} {:>9}",
                name, m.precision, m.recall, m.f1, m.support
            )
        };

        writeln!(f, "{:>W$} {:>9} {:>9} {:>9} {:>9}", "", "precision", "recall", "f1-score", "support")?;
        writeln!(f)?;
        for (label, m) in &self.classes {
            row(f, label.as_str(), m)?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "{:>W$} {:>9} {:>9} {:>9.2} {:>9}",
            "accuracy", "", "", self.accuracy, self.macro_avg.support
        )?;
        row(f, "macro avg", &self.macro_avg)?;
        row(f, "weighted avg", &self.weighted_avg)
    }
}
