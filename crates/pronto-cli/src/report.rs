//! Text and JSON rendering for repair and verification.
//!
//! Text output is a fixed-width table without colors. JSON output is a single
//! document on one line.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use pronto_models::{NormalizedEmail, Role, ScopeSet};
use serde::Serialize;

use crate::repair::{RepairAction, RepairPlan};
use crate::verify::{Classification, VerifyEntry};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Inserted,
    Updated,
    Unchanged,
    Skipped,
}

impl Outcome {
    fn as_str(self) -> &'static str {
        match self {
            Self::Inserted => "inserted",
            Self::Updated => "updated",
            Self::Unchanged => "unchanged",
            Self::Skipped => "skipped",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetOutcome {
    pub email: NormalizedEmail,
    pub role: Role,
    pub outcome: Outcome,
    /// Columns written (or, in a dry run, that would be written).
    pub changes: Vec<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SweptRow {
    pub id: String,
    pub role: Role,
    pub from: String,
    pub to: ScopeSet,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepairReport {
    pub dry_run: bool,
    pub targets: Vec<TargetOutcome>,
    pub swept: Vec<SweptRow>,
    pub warnings: Vec<String>,
}

impl RepairReport {
    pub fn from_plan(plan: &RepairPlan, dry_run: bool) -> Self {
        let mut targets = Vec::new();
        let mut swept = Vec::new();

        for action in &plan.actions {
            match action {
                RepairAction::Insert { target, .. } => targets.push(TargetOutcome {
                    email: target.email.clone(),
                    role: target.role,
                    outcome: Outcome::Inserted,
                    changes: vec![
                        "identifier_hash",
                        "credential_hash",
                        "encrypted_name",
                        "encrypted_email",
                        "role",
                        "allowed_scopes",
                        "is_active",
                    ],
                }),
                RepairAction::Update {
                    target, changes, ..
                } => targets.push(TargetOutcome {
                    email: target.email.clone(),
                    role: target.role,
                    outcome: if changes.is_empty() {
                        Outcome::Unchanged
                    } else {
                        Outcome::Updated
                    },
                    changes: changes.iter().map(|c| c.column()).collect(),
                }),
                RepairAction::Skip { target, .. } => targets.push(TargetOutcome {
                    email: target.email.clone(),
                    role: target.role,
                    outcome: Outcome::Skipped,
                    changes: Vec::new(),
                }),
                RepairAction::SweepScopes { id, role, from, to } => swept.push(SweptRow {
                    id: id.clone(),
                    role: *role,
                    from: from.clone(),
                    to: to.clone(),
                }),
            }
        }

        Self {
            dry_run,
            targets,
            swept,
            warnings: plan.warnings.clone(),
        }
    }

    pub fn count(&self, outcome: Outcome) -> usize {
        self.targets.iter().filter(|t| t.outcome == outcome).count()
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }

    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let mode = if self.dry_run { " (dry run, nothing written)" } else { "" };
        let _ = writeln!(
            out,
            "repair{}: {} targets, {} inserted, {} updated, {} unchanged, {} skipped",
            mode,
            self.targets.len(),
            self.count(Outcome::Inserted),
            self.count(Outcome::Updated),
            self.count(Outcome::Unchanged),
            self.count(Outcome::Skipped),
        );
        let _ = writeln!(out, "{:<8} {:<32} {:<10} CHANGES", "ROLE", "EMAIL", "OUTCOME");
        for t in &self.targets {
            let changes = if t.changes.is_empty() {
                "-".to_string()
            } else {
                t.changes.join(",")
            };
            let _ = writeln!(
                out,
                "{:<8} {:<32} {:<10} {}",
                t.role.as_str(),
                t.email.as_str(),
                t.outcome.as_str(),
                changes
            );
        }
        if !self.swept.is_empty() {
            let _ = writeln!(out, "scope sweep: {} row(s)", self.swept.len());
            for s in &self.swept {
                let _ = writeln!(out, "  row {} ({}): {} -> {}", s.id, s.role, s.from, s.to.to_json());
            }
        }
        for w in &self.warnings {
            let _ = writeln!(out, "warning: {}", w);
        }
        out
    }
}

/// Verification result, ordered by (role, email).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyReport {
    entries: Vec<VerifyEntry>,
}

#[derive(Serialize)]
struct JsonEntry<'a> {
    email: &'a str,
    status: Classification,
}

impl VerifyReport {
    pub fn new(mut entries: Vec<VerifyEntry>) -> Self {
        entries.sort_by(|a, b| {
            a.role
                .as_str()
                .cmp(b.role.as_str())
                .then_with(|| a.email.cmp(&b.email))
        });
        Self { entries }
    }

    pub fn entries(&self) -> &[VerifyEntry] {
        &self.entries
    }

    pub fn status_of(&self, email: &str) -> Option<Classification> {
        self.entries
            .iter()
            .find(|e| e.email.as_str() == email)
            .map(|e| e.status)
    }

    pub fn is_clean(&self) -> bool {
        self.entries.iter().all(|e| !e.status.is_drift())
    }

    /// `0` when every managed row is OK, `2` when any drift was found.
    pub fn exit_code(&self) -> u8 {
        if self.is_clean() { 0 } else { 2 }
    }

    /// `{role: [{email, status}]}`, roles and entries in sorted order.
    pub fn to_json(&self) -> String {
        let mut grouped: BTreeMap<&str, Vec<JsonEntry<'_>>> = BTreeMap::new();
        for e in &self.entries {
            grouped.entry(e.role.as_str()).or_default().push(JsonEntry {
                email: e.email.as_str(),
                status: e.status,
            });
        }
        serde_json::to_string(&grouped).unwrap_or_else(|_| "{}".to_string())
    }

    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{:<8} {:<32} {:<15} SCOPES", "ROLE", "EMAIL", "STATUS");
        let mut current: Option<Role> = None;
        for e in &self.entries {
            if current.is_some() && current != Some(e.role) {
                out.push('\n');
            }
            current = Some(e.role);
            let _ = writeln!(
                out,
                "{:<8} {:<32} {:<15} {}",
                e.role.as_str(),
                e.email.as_str(),
                e.status.as_str(),
                e.role.canonical_scopes()
            );
        }
        let drifted = self.entries.iter().filter(|e| e.status.is_drift()).count();
        let _ = writeln!(
            out,
            "{} checked, {} ok, {} drifted",
            self.entries.len(),
            self.entries.len() - drifted,
            drifted
        );
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(email: &str, role: Role, status: Classification) -> VerifyEntry {
        VerifyEntry {
            email: NormalizedEmail::new(email).unwrap(),
            role,
            status,
        }
    }

    #[test]
    fn test_verify_json_grouped_and_sorted() {
        let report = VerifyReport::new(vec![
            entry("waiter@cafeteria.test", Role::Waiter, Classification::Ok),
            entry("b-admin@cafeteria.test", Role::Admin, Classification::Missing),
            entry("a-admin@cafeteria.test", Role::Admin, Classification::Ok),
        ]);
        assert_eq!(
            report.to_json(),
            r#"{"admin":[{"email":"a-admin@cafeteria.test","status":"OK"},{"email":"b-admin@cafeteria.test","status":"MISSING"}],"waiter":[{"email":"waiter@cafeteria.test","status":"OK"}]}"#
        );
        assert_eq!(report.exit_code(), 2);
    }

    #[test]
    fn test_verify_text_table() {
        let report = VerifyReport::new(vec![
            entry("system@cafeteria.test", Role::System, Classification::Ok),
            entry("admin@cafeteria.test", Role::Admin, Classification::ScopeDrift),
        ]);
        let text = report.render_text();
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[0].starts_with("ROLE"));
        assert!(lines[1].starts_with("admin    admin@cafeteria.test"));
        assert!(lines[1].contains("SCOPE_DRIFT"));
        assert_eq!(lines[2], "");
        assert!(lines[3].contains("system"));
        assert!(lines[3].ends_with("admin,system"));
        assert_eq!(lines[4], "2 checked, 1 ok, 1 drifted");
    }

    #[test]
    fn test_clean_report_exit_code() {
        let report = VerifyReport::new(vec![entry(
            "chef@cafeteria.test",
            Role::Chef,
            Classification::Ok,
        )]);
        assert!(report.is_clean());
        assert_eq!(report.exit_code(), 0);
        assert_eq!(report.status_of("chef@cafeteria.test"), Some(Classification::Ok));
    }

    #[test]
    fn test_repair_report_from_empty_plan() {
        let report = RepairReport::from_plan(&RepairPlan::default(), true);
        let text = report.render_text();
        assert!(text.starts_with("repair (dry run, nothing written): 0 targets"));
        assert!(report.to_json().contains(r#""dry_run":true"#));
    }
}
