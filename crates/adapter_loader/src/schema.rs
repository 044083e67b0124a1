//! Column role configuration and resolution.

use crate::error::SchemaError;
use std::collections::BTreeSet;
use std::fmt;

/// Canonical role a source column can play.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ColumnRole {
    /// Destination country (reporter in import-oriented data)
    Importer,
    /// Origin country (partner in import-oriented data)
    Exporter,
    /// Reference year
    Year,
    /// Trade value
    Value,
    /// Commodity description (optional)
    Commodity,
    /// Declared flow direction (optional)
    Flow,
}

impl ColumnRole {
    /// Get human-readable name.
    pub fn name(&self) -> &'static str {
        match self {
            ColumnRole::Importer => "Importer",
            ColumnRole::Exporter => "Exporter",
            ColumnRole::Year => "Year",
            ColumnRole::Value => "Value",
            ColumnRole::Commodity => "Commodity",
            ColumnRole::Flow => "Flow",
        }
    }

    /// The four roles every table must resolve.
    pub fn canonical() -> [ColumnRole; 4] {
        [
            ColumnRole::Importer,
            ColumnRole::Exporter,
            ColumnRole::Year,
            ColumnRole::Value,
        ]
    }
}

impl fmt::Display for ColumnRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Ordered candidate substrings for one role.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoleCandidates {
    /// Role being resolved
    pub role: ColumnRole,
    /// Substrings tried in order, case-insensitively
    pub candidates: Vec<String>,
    /// Whether failure to resolve is fatal
    pub required: bool,
}

impl RoleCandidates {
    /// Create a role entry.
    pub fn new<S: Into<String>>(
        role: ColumnRole,
        candidates: impl IntoIterator<Item = S>,
        required: bool,
    ) -> Self {
        Self {
            role,
            candidates: candidates.into_iter().map(Into::into).collect(),
            required,
        }
    }
}

/// A header matched to a role.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedColumn {
    /// Position in the header row
    pub index: usize,
    /// Header text as read
    pub name: String,
}

/// Locate the column for `role` in `headers`.
///
/// Candidates are tried in order; for each candidate the headers are scanned
/// left to right and the first header containing the candidate
/// (case-insensitive) wins. Headers in `claimed` are skipped so two roles
/// never share a column.
///
/// # Examples
///
/// ```
/// use adapter_loader::{resolve_column, ColumnRole, RoleCandidates};
/// use std::collections::BTreeSet;
///
/// let headers = ["reporterDesc", "reporterISO", "refYear"];
/// let role = RoleCandidates::new(ColumnRole::Importer, ["reporteriso", "reporter"], true);
///
/// let column = resolve_column(&headers, &role, &BTreeSet::new()).unwrap();
/// assert_eq!(column.name, "reporterISO");
/// ```
pub fn resolve_column<S: AsRef<str>>(
    headers: &[S],
    role: &RoleCandidates,
    claimed: &BTreeSet<usize>,
) -> Result<ResolvedColumn, SchemaError> {
    let lowered: Vec<String> = headers
        .iter()
        .map(|h| h.as_ref().trim().to_lowercase())
        .collect();

    for candidate in &role.candidates {
        let candidate = candidate.trim().to_lowercase();
        if candidate.is_empty() {
            continue;
        }
        let hit = lowered
            .iter()
            .enumerate()
            .find(|(idx, header)| !claimed.contains(idx) && header.contains(&candidate));
        if let Some((index, _)) = hit {
            return Ok(ResolvedColumn {
                index,
                name: headers[index].as_ref().to_string(),
            });
        }
    }

    Err(SchemaError::MissingColumn {
        role: role.role,
        candidates: role.candidates.clone(),
        headers: headers.iter().map(|h| h.as_ref().to_string()).collect(),
    })
}

/// Ordered role configuration consumed by the normaliser.
///
/// Roles are resolved in configuration order, so earlier roles get first pick
/// of ambiguous headers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SchemaConfig {
    roles: Vec<RoleCandidates>,
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            roles: vec![
                RoleCandidates::new(
                    ColumnRole::Importer,
                    ["reporteriso", "reporter", "importer"],
                    true,
                ),
                RoleCandidates::new(
                    ColumnRole::Exporter,
                    ["partneriso", "partner", "exporter"],
                    true,
                ),
                RoleCandidates::new(ColumnRole::Year, ["refyear", "year"], true),
                RoleCandidates::new(
                    ColumnRole::Value,
                    ["primaryvalue", "tradevalue", "value"],
                    true,
                ),
                RoleCandidates::new(ColumnRole::Commodity, ["cmddesc", "commodity"], false),
                RoleCandidates::new(ColumnRole::Flow, ["flowdesc", "flow"], false),
            ],
        }
    }
}

impl SchemaConfig {
    /// Build from explicit role entries.
    pub fn new(roles: Vec<RoleCandidates>) -> Self {
        Self { roles }
    }

    /// Role entries in resolution order.
    pub fn roles(&self) -> &[RoleCandidates] {
        &self.roles
    }

    /// Replace the candidate list for `role`, keeping its position.
    ///
    /// A role not yet configured is appended as optional unless it is one of
    /// the canonical four.
    pub fn with_candidates<S: Into<String>>(
        mut self,
        role: ColumnRole,
        candidates: impl IntoIterator<Item = S>,
    ) -> Self {
        let candidates: Vec<String> = candidates.into_iter().map(Into::into).collect();
        match self.roles.iter_mut().find(|r| r.role == role) {
            Some(entry) => entry.candidates = candidates,
            None => {
                let required = ColumnRole::canonical().contains(&role);
                self.roles.push(RoleCandidates::new(role, candidates, required));
            }
        }
        self
    }

    /// Resolve every configured role against a header row.
    pub fn resolve<S: AsRef<str>>(&self, headers: &[S]) -> Result<ResolvedSchema, SchemaError> {
        if headers.is_empty() {
            return Err(SchemaError::EmptyHeader);
        }

        let mut claimed = BTreeSet::new();
        let mut resolved: Vec<(ColumnRole, ResolvedColumn)> = Vec::new();

        for role in &self.roles {
            match resolve_column(headers, role, &claimed) {
                Ok(column) => {
                    claimed.insert(column.index);
                    resolved.push((role.role, column));
                }
                Err(err) if role.required => return Err(err),
                Err(_) => {}
            }
        }

        let take = |role: ColumnRole| -> Option<ResolvedColumn> {
            resolved
                .iter()
                .find(|(r, _)| *r == role)
                .map(|(_, c)| c.clone())
        };
        let require = |role: ColumnRole| take(role).ok_or(SchemaError::UnconfiguredRole(role));

        Ok(ResolvedSchema {
            importer: require(ColumnRole::Importer)?,
            exporter: require(ColumnRole::Exporter)?,
            year: require(ColumnRole::Year)?,
            value: require(ColumnRole::Value)?,
            commodity: take(ColumnRole::Commodity),
            flow: take(ColumnRole::Flow),
        })
    }
}

/// Column positions for every resolved role.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedSchema {
    /// Importer column
    pub importer: ResolvedColumn,
    /// Exporter column
    pub exporter: ResolvedColumn,
    /// Year column
    pub year: ResolvedColumn,
    /// Value column
    pub value: ResolvedColumn,
    /// Commodity column, when present
    pub commodity: Option<ResolvedColumn>,
    /// Flow column, when present
    pub flow: Option<ResolvedColumn>,
}

impl ResolvedSchema {
    /// Every resolved role with its column, in canonical order.
    pub fn columns(&self) -> Vec<(ColumnRole, &ResolvedColumn)> {
        let mut columns = vec![
            (ColumnRole::Importer, &self.importer),
            (ColumnRole::Exporter, &self.exporter),
            (ColumnRole::Year, &self.year),
            (ColumnRole::Value, &self.value),
        ];
        columns.extend(self.commodity.as_ref().map(|c| (ColumnRole::Commodity, c)));
        columns.extend(self.flow.as_ref().map(|c| (ColumnRole::Flow, c)));
        columns
    }
}
