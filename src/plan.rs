//! Test plans: which file pairs to combine, how, and where to save the result.
//!
//! Plans are TOML documents:
//!
//! ```toml
//! [preprocess.smoothing]
//! iterations = 10
//!
//! [[cases]]
//! name = "union"
//! operation = "union"
//! inputs = ["Data0-Union.stl", "Data1-Union.stl"]
//! output = "Data0-Union-Data1.stl"
//! ```

use crate::boolean::BooleanOp;
use crate::pipeline::PreprocessParams;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlanError {
    #[error("could not read plan {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not parse plan {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("no case number {number}; the plan has {count} cases")]
    NoSuchCase { number: usize, count: usize },
}

const fn enabled_by_default() -> bool {
    true
}

/// One boolean invocation.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TestCase {
    pub name: String,
    pub operation: BooleanOp,
    /// Operands A and B
    pub inputs: [PathBuf; 2],
    pub output: PathBuf,
    #[serde(default)]
    pub preprocess: bool,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
    /// Known behaviour of the case, printed when it is skipped
    #[serde(default)]
    pub note: Option<String>,
}

impl TestCase {
    pub fn new(
        name: impl Into<String>,
        operation: BooleanOp,
        a: impl Into<PathBuf>,
        b: impl Into<PathBuf>,
        output: impl Into<PathBuf>,
    ) -> Self {
        Self {
            name: name.into(),
            operation,
            inputs: [a.into(), b.into()],
            output: output.into(),
            preprocess: false,
            enabled: true,
            note: None,
        }
    }

    pub fn with_preprocess(mut self, preprocess: bool) -> Self {
        self.preprocess = preprocess;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

/// Which cases of a plan to run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CaseSelection {
    /// Every case with `enabled = true`
    #[default]
    Enabled,
    All,
    /// 1-based case numbers, run regardless of `enabled`
    Numbers(Vec<usize>),
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TestPlan {
    #[serde(default)]
    pub preprocess: PreprocessParams,
    #[serde(default)]
    pub cases: Vec<TestCase>,
}

impl TestPlan {
    /// The five stock cases. Only the first two run by default; the rest
    /// are kept for reference with the behaviour they are known for.
    pub fn builtin() -> Self {
        let cases = vec![
            TestCase::new(
                "union",
                BooleanOp::Union,
                "Data0-Union.stl",
                "Data1-Union.stl",
                "Data0-Union-Data1.stl",
            )
            .with_note("has been seen to return the difference instead of the union"),
            TestCase::new(
                "difference",
                BooleanOp::Difference,
                "Data0-Union.stl",
                "Data1-Union.stl",
                "Data0-Difference-Data1.stl",
            )
            .with_note("may crash, or return the union, in x64 debug builds"),
            TestCase::new(
                "crash-preprocessed",
                BooleanOp::Difference,
                "Data3-Crash.stl",
                "Data4-Crash.stl",
                "Data3-Difference-Data4.stl",
            )
            .with_preprocess(true)
            .disabled()
            .with_note("fails with \"Contact ends suddenly.\""),
            TestCase::new(
                "union-minus-crash",
                BooleanOp::Difference,
                "Data0-Union.stl",
                "Data4-Crash.stl",
                "Data0-Difference-Data4.stl",
            )
            .disabled()
            .with_note("may crash, or return the union, in x64 debug builds"),
            TestCase::new(
                "crash-minus-union",
                BooleanOp::Difference,
                "Data3-Crash.stl",
                "Data1-Union.stl",
                "Data3-Difference-Data1.stl",
            )
            .disabled()
            .with_note("fails with \"Contact ends suddenly.\""),
        ];

        Self {
            preprocess: PreprocessParams::default(),
            cases,
        }
    }

    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, PlanError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| PlanError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text).map_err(|source| PlanError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Cases to run, paired with their 1-based numbers.
    pub fn select(&self, selection: &CaseSelection) -> Result<Vec<(usize, &TestCase)>, PlanError> {
        let numbered = self.cases.iter().enumerate().map(|(i, c)| (i + 1, c));
        match selection {
            CaseSelection::Enabled => Ok(numbered.filter(|(_, c)| c.enabled).collect()),
            CaseSelection::All => Ok(numbered.collect()),
            CaseSelection::Numbers(numbers) => numbers
                .iter()
                .map(|&number| {
                    number
                        .checked_sub(1)
                        .and_then(|i| self.cases.get(i))
                        .map(|case| (number, case))
                        .ok_or(PlanError::NoSuchCase {
                            number,
                            count: self.cases.len(),
                        })
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_enables_first_two_cases() {
        let plan = TestPlan::builtin();
        assert_eq!(plan.cases.len(), 5);
        let enabled: Vec<usize> = plan
            .select(&CaseSelection::Enabled)
            .expect("enabled cases")
            .into_iter()
            .map(|(n, _)| n)
            .collect();
        assert_eq!(enabled, vec![1, 2]);
        assert!(plan.cases[2].preprocess);
        assert!(plan.cases.iter().all(|c| c.note.is_some()));
    }

    #[test]
    fn shipped_plan_matches_builtin() {
        let shipped = TestPlan::from_toml_str(include_str!("../plans/builtin.toml"))
            .expect("shipped plan parses");
        assert_eq!(shipped, TestPlan::builtin());
    }

    #[test]
    fn explicit_numbers_include_disabled_cases() {
        let plan = TestPlan::builtin();
        let picked = plan
            .select(&CaseSelection::Numbers(vec![5, 1]))
            .expect("valid numbers");
        assert_eq!(picked[0].0, 5);
        assert_eq!(picked[0].1.output, PathBuf::from("Data3-Difference-Data1.stl"));
        assert_eq!(picked[1].1.operation, BooleanOp::Union);

        assert!(matches!(
            plan.select(&CaseSelection::Numbers(vec![0])),
            Err(PlanError::NoSuchCase { number: 0, count: 5 })
        ));
    }

    #[test]
    fn minimal_case_uses_defaults() {
        let plan = TestPlan::from_toml_str(
            r#"
            [[cases]]
            name = "b-minus-a"
            operation = "difference2"
            inputs = ["a.stl", "b.stl"]
            output = "out.stl"
            "#,
        )
        .expect("valid plan");
        let case = &plan.cases[0];
        assert_eq!(case.operation, BooleanOp::Difference2);
        assert!(case.enabled);
        assert!(!case.preprocess);
        assert_eq!(plan.preprocess, PreprocessParams::default());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let result = TestPlan::from_toml_str(
            r#"
            [[cases]]
            name = "x"
            operation = "union"
            inputs = ["a.stl", "b.stl"]
            output = "out.stl"
            colour = "red"
            "#,
        );
        assert!(result.is_err());
    }
}
