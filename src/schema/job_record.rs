use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Lifecycle stage of a job, controlled by administrators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdminStage {
    Open,
    #[serde(rename = "In progress")]
    InProgress,
    Completed,
    Closed,
}

impl AdminStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdminStage::Open => "Open",
            AdminStage::InProgress => "In progress",
            AdminStage::Completed => "Completed",
            AdminStage::Closed => "Closed",
        }
    }

    /// Parse a stored stage string. Older documents spell the in-progress
    /// stage three different ways.
    pub fn parse(raw: &str) -> Option<AdminStage> {
        match raw {
            "Open" => Some(AdminStage::Open),
            "In progress" | "In Progress" | "In-Progress" | "InProgress" => {
                Some(AdminStage::InProgress)
            }
            "Completed" => Some(AdminStage::Completed),
            "Closed" => Some(AdminStage::Closed),
            _ => None,
        }
    }
}

/// Display-urgency tag shown on job cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UrgencyTag {
    Available,
    Upcoming,
    Urgent,
}

impl UrgencyTag {
    pub fn parse(raw: &str) -> Option<UrgencyTag> {
        match raw {
            "Available" => Some(UrgencyTag::Available),
            "Upcoming" => Some(UrgencyTag::Upcoming),
            "Urgent" => Some(UrgencyTag::Urgent),
            _ => None,
        }
    }
}

/// Canonical job shape presented to every caller, regardless of which
/// historical schema version the stored document uses.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub location: String,
    pub date: String,
    pub time: String,
    pub payment: f64,
    pub admin_stage: AdminStage,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cleaners_needed: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<UrgencyTag>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary_payment: Option<f64>,
}

/// Input for creating a job. Written as a canonical (v3) document.
#[derive(Debug, Clone)]
pub struct NewJob {
    pub title: String,
    pub description: String,
    pub location: String,
    pub date: Option<String>,
    pub time: Option<String>,
    pub payment: f64,
    pub admin_stage: AdminStage,
    pub cleaners_needed: Option<u32>,
    pub category: Option<String>,
    pub duration: Option<String>,
    pub area: Option<String>,
    pub status: Option<UrgencyTag>,
    pub secondary_payment: Option<f64>,
}

/// Partial update. Only provided fields are merged into the stored
/// document; `secondary_payment` is always written (nulled when absent)
/// so a stale value never survives an edit.
#[derive(Debug, Clone, Default)]
pub struct JobPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub payment: Option<f64>,
    pub admin_stage: Option<AdminStage>,
    pub cleaners_needed: Option<u32>,
    pub assigned_to: Option<String>,
    pub category: Option<String>,
    pub duration: Option<String>,
    pub area: Option<String>,
    pub status: Option<UrgencyTag>,
    pub secondary_payment: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SchemaVersion {
    V1,
    V2,
    V3,
}

/// Decide which schema generation a stored document belongs to.
///
/// An explicit `schemaVersion` field wins; otherwise the generation is
/// inferred from the field names the document carries:
/// - v1 used `projectName`/`projectDescription`/`address`/`datetime`,
/// - v2 used `jobTitle`/`jobDescription`/`scheduledAt`,
/// - v3 (canonical) uses `title`/`description`/`location` with separate
///   `date` and `time` display strings.
fn detect_version(doc: &Map<String, Value>) -> SchemaVersion {
    match doc.get("schemaVersion").and_then(Value::as_u64) {
        Some(1) => return SchemaVersion::V1,
        Some(2) => return SchemaVersion::V2,
        Some(_) => return SchemaVersion::V3,
        None => {}
    }
    if doc.contains_key("projectName")
        || doc.contains_key("projectDescription")
        || doc.contains_key("datetime")
    {
        SchemaVersion::V1
    } else if doc.contains_key("jobTitle") || doc.contains_key("jobDescription") {
        SchemaVersion::V2
    } else {
        SchemaVersion::V3
    }
}

/// Move a legacy field to its newer name, unless the newer name is
/// already present (newer data wins over older aliases).
fn rename_field(doc: &mut Map<String, Value>, from: &str, to: &str) {
    if let Some(value) = doc.remove(from) {
        doc.entry(to.to_string()).or_insert(value);
    }
}

fn upgrade_v1_to_v2(doc: &mut Map<String, Value>) {
    rename_field(doc, "projectName", "jobTitle");
    rename_field(doc, "projectDescription", "jobDescription");
    rename_field(doc, "address", "location");
    rename_field(doc, "datetime", "scheduledAt");
}

fn upgrade_v2_to_v3(doc: &mut Map<String, Value>) {
    rename_field(doc, "jobTitle", "title");
    rename_field(doc, "jobDescription", "description");
}

/// Upgrade a stored document of any generation to the canonical (v3)
/// field set. Also derives the `date`/`time` display strings from a
/// combined timestamp when the document lacks them.
pub fn upgrade_to_canonical(doc: &Value) -> Map<String, Value> {
    let mut doc = match doc.as_object() {
        Some(map) => map.clone(),
        None => Map::new(),
    };

    if detect_version(&doc) == SchemaVersion::V1 {
        upgrade_v1_to_v2(&mut doc);
    }
    if detect_version(&doc) == SchemaVersion::V2 {
        upgrade_v2_to_v3(&mut doc);
    }

    let needs_date = !matches!(doc.get("date"), Some(Value::String(_)));
    let needs_time = !matches!(doc.get("time"), Some(Value::String(_)));
    if needs_date || needs_time {
        let split = doc
            .get("scheduledAt")
            .and_then(Value::as_str)
            .and_then(split_timestamp);
        if let Some((date, time)) = split {
            if needs_date {
                doc.insert("date".to_string(), Value::String(date));
            }
            if needs_time {
                doc.insert("time".to_string(), Value::String(time));
            }
        }
    }

    doc.insert("schemaVersion".to_string(), Value::from(3u64));
    doc
}

/// Normalize a stored document into the canonical `Job` shape,
/// supplying defaults for missing or malformed fields.
pub fn normalize(id: Uuid, doc: &Value) -> Job {
    let doc = upgrade_to_canonical(doc);

    Job {
        id,
        title: str_field(&doc, "title").unwrap_or_else(|| "Untitled job".to_string()),
        description: str_field(&doc, "description").unwrap_or_default(),
        location: str_field(&doc, "location").unwrap_or_default(),
        date: str_field(&doc, "date").unwrap_or_default(),
        time: str_field(&doc, "time").unwrap_or_default(),
        payment: coerce_payment(doc.get("payment")).unwrap_or(0.0),
        admin_stage: doc
            .get("adminStage")
            .and_then(Value::as_str)
            .and_then(AdminStage::parse)
            .unwrap_or(AdminStage::Open),
        cleaners_needed: doc
            .get("cleanersNeeded")
            .and_then(Value::as_u64)
            .map(|n| n as u32),
        assigned_to: str_field(&doc, "assignedTo"),
        category: str_field(&doc, "category"),
        duration: str_field(&doc, "duration"),
        area: str_field(&doc, "area"),
        status: doc
            .get("status")
            .and_then(Value::as_str)
            .and_then(UrgencyTag::parse),
        secondary_payment: coerce_payment(doc.get("secondaryPayment")),
    }
}

fn str_field(doc: &Map<String, Value>, key: &str) -> Option<String> {
    doc.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Coerce a stored payment into a non-negative number. Legacy records
/// stored payments as strings; anything unparseable becomes 0.
pub fn coerce_payment(value: Option<&Value>) -> Option<f64> {
    let amount = match value {
        Some(Value::Number(n)) => n.as_f64()?,
        Some(Value::String(s)) => s.trim().parse::<f64>().unwrap_or(0.0),
        _ => return None,
    };
    Some(if amount.is_finite() && amount > 0.0 {
        amount
    } else {
        0.0
    })
}

/// Split a combined timestamp into `YYYY-MM-DD` and `HH:MM` display
/// strings. Accepts RFC 3339 and the bare forms older records used.
pub fn split_timestamp(raw: &str) -> Option<(String, String)> {
    let parsed = DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.naive_local())
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S"))
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M"))
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S"))
        .ok()?;
    Some((
        parsed.format("%Y-%m-%d").to_string(),
        parsed.format("%H:%M").to_string(),
    ))
}

/// Combine separate date and time display strings into one stored
/// timestamp. Returns `None` when either half does not parse.
pub fn combine_date_time(date: &str, time: &str) -> Option<String> {
    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?;
    let time = NaiveTime::parse_from_str(time, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(time, "%H:%M:%S"))
        .ok()?;
    Some(
        NaiveDateTime::new(date, time)
            .format("%Y-%m-%dT%H:%M:%S")
            .to_string(),
    )
}

impl NewJob {
    /// Build the canonical document written to storage.
    pub fn to_document(&self) -> Value {
        let mut doc = Map::new();
        doc.insert("schemaVersion".to_string(), Value::from(3u64));
        doc.insert("title".to_string(), Value::String(self.title.clone()));
        doc.insert(
            "description".to_string(),
            Value::String(self.description.clone()),
        );
        doc.insert(
            "location".to_string(),
            Value::String(self.location.clone()),
        );
        doc.insert("payment".to_string(), json_number(self.payment.max(0.0)));
        doc.insert(
            "adminStage".to_string(),
            Value::String(self.admin_stage.as_str().to_string()),
        );
        if let Some(date) = &self.date {
            doc.insert("date".to_string(), Value::String(date.clone()));
        }
        if let Some(time) = &self.time {
            doc.insert("time".to_string(), Value::String(time.clone()));
        }
        if let (Some(date), Some(time)) = (&self.date, &self.time) {
            if let Some(ts) = combine_date_time(date, time) {
                doc.insert("scheduledAt".to_string(), Value::String(ts));
            }
        }
        if let Some(n) = self.cleaners_needed {
            doc.insert("cleanersNeeded".to_string(), Value::from(n));
        }
        if let Some(category) = &self.category {
            doc.insert("category".to_string(), Value::String(category.clone()));
        }
        if let Some(duration) = &self.duration {
            doc.insert("duration".to_string(), Value::String(duration.clone()));
        }
        if let Some(area) = &self.area {
            doc.insert("area".to_string(), Value::String(area.clone()));
        }
        if let Some(tag) = &self.status {
            doc.insert(
                "status".to_string(),
                serde_json::to_value(tag).unwrap_or(Value::Null),
            );
        }
        match self.secondary_payment {
            Some(amount) => {
                doc.insert("secondaryPayment".to_string(), json_number(amount.max(0.0)));
            }
            None => {
                doc.insert("secondaryPayment".to_string(), Value::Null);
            }
        }
        Value::Object(doc)
    }
}

impl JobPatch {
    /// Merge this patch into a stored document. The document is first
    /// upgraded to the canonical field set so edits never reintroduce
    /// legacy aliases. The combined timestamp is re-derived whenever
    /// either the date or the time changes.
    pub fn apply_to(&self, doc: &Value) -> Value {
        let mut doc = upgrade_to_canonical(doc);

        if let Some(title) = &self.title {
            doc.insert("title".to_string(), Value::String(title.clone()));
        }
        if let Some(description) = &self.description {
            doc.insert(
                "description".to_string(),
                Value::String(description.clone()),
            );
        }
        if let Some(location) = &self.location {
            doc.insert("location".to_string(), Value::String(location.clone()));
        }
        if let Some(date) = &self.date {
            doc.insert("date".to_string(), Value::String(date.clone()));
        }
        if let Some(time) = &self.time {
            doc.insert("time".to_string(), Value::String(time.clone()));
        }
        if let Some(payment) = self.payment {
            doc.insert("payment".to_string(), json_number(payment.max(0.0)));
        }
        if let Some(stage) = self.admin_stage {
            doc.insert(
                "adminStage".to_string(),
                Value::String(stage.as_str().to_string()),
            );
        }
        if let Some(n) = self.cleaners_needed {
            doc.insert("cleanersNeeded".to_string(), Value::from(n));
        }
        if let Some(assigned) = &self.assigned_to {
            doc.insert("assignedTo".to_string(), Value::String(assigned.clone()));
        }
        if let Some(category) = &self.category {
            doc.insert("category".to_string(), Value::String(category.clone()));
        }
        if let Some(duration) = &self.duration {
            doc.insert("duration".to_string(), Value::String(duration.clone()));
        }
        if let Some(area) = &self.area {
            doc.insert("area".to_string(), Value::String(area.clone()));
        }
        if let Some(tag) = &self.status {
            doc.insert(
                "status".to_string(),
                serde_json::to_value(tag).unwrap_or(Value::Null),
            );
        }

        // Always written: an edit that omits the secondary payment
        // clears it rather than leaving a stale amount behind.
        match self.secondary_payment {
            Some(amount) => {
                doc.insert("secondaryPayment".to_string(), json_number(amount.max(0.0)));
            }
            None => {
                doc.insert("secondaryPayment".to_string(), Value::Null);
            }
        }

        if self.date.is_some() || self.time.is_some() {
            let combined = match (
                doc.get("date").and_then(Value::as_str),
                doc.get("time").and_then(Value::as_str),
            ) {
                (Some(date), Some(time)) => combine_date_time(date, time),
                _ => None,
            };
            match combined {
                Some(ts) => {
                    doc.insert("scheduledAt".to_string(), Value::String(ts));
                }
                None => {
                    doc.remove("scheduledAt");
                }
            }
        }

        Value::Object(doc)
    }
}

fn json_number(value: f64) -> Value {
    serde_json::Number::from_f64(value)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn job_id() -> Uuid {
        Uuid::nil()
    }

    #[test]
    fn v1_document_normalizes_to_canonical_shape() {
        let doc = json!({
            "projectName": "End of lease clean",
            "projectDescription": "Three bedrooms, two bathrooms",
            "address": "12 Harbour St, Sydney",
            "payment": "350",
            "datetime": "2024-03-08T09:30:00"
        });

        let job = normalize(job_id(), &doc);
        assert_eq!(job.title, "End of lease clean");
        assert_eq!(job.description, "Three bedrooms, two bathrooms");
        assert_eq!(job.location, "12 Harbour St, Sydney");
        assert_eq!(job.payment, 350.0);
        assert_eq!(job.date, "2024-03-08");
        assert_eq!(job.time, "09:30");
        assert_eq!(job.admin_stage, AdminStage::Open);
    }

    #[test]
    fn v2_document_normalizes_and_keeps_stage() {
        let doc = json!({
            "jobTitle": "Office clean",
            "jobDescription": "Weekly office clean",
            "location": "Melbourne CBD",
            "payment": 120,
            "scheduledAt": "2024-05-01T18:00:00",
            "adminStage": "In progress"
        });

        let job = normalize(job_id(), &doc);
        assert_eq!(job.title, "Office clean");
        assert_eq!(job.admin_stage, AdminStage::InProgress);
        assert_eq!(job.date, "2024-05-01");
        assert_eq!(job.time, "18:00");
    }

    #[test]
    fn canonical_field_wins_over_legacy_alias() {
        let doc = json!({
            "title": "Current title",
            "jobTitle": "Older title",
            "projectName": "Oldest title"
        });

        let job = normalize(job_id(), &doc);
        assert_eq!(job.title, "Current title");
    }

    #[test]
    fn missing_payment_defaults_to_zero() {
        let job = normalize(job_id(), &json!({ "title": "No pay listed" }));
        assert_eq!(job.payment, 0.0);
    }

    #[test]
    fn string_payment_is_parsed() {
        let job = normalize(job_id(), &json!({ "payment": "45.50" }));
        assert_eq!(job.payment, 45.5);
    }

    #[test]
    fn malformed_and_negative_payments_become_zero() {
        assert_eq!(
            normalize(job_id(), &json!({ "payment": "call us" })).payment,
            0.0
        );
        assert_eq!(normalize(job_id(), &json!({ "payment": -20 })).payment, 0.0);
    }

    #[test]
    fn missing_fields_get_defaults() {
        let job = normalize(job_id(), &json!({}));
        assert_eq!(job.title, "Untitled job");
        assert_eq!(job.description, "");
        assert_eq!(job.location, "");
        assert_eq!(job.admin_stage, AdminStage::Open);
        assert!(job.secondary_payment.is_none());
    }

    #[test]
    fn stage_spelling_variants_parse() {
        for raw in ["In progress", "In Progress", "In-Progress", "InProgress"] {
            assert_eq!(AdminStage::parse(raw), Some(AdminStage::InProgress));
        }
        assert_eq!(AdminStage::parse("archived"), None);
    }

    #[test]
    fn new_job_combines_date_and_time() {
        let new_job = NewJob {
            title: "Bond clean".to_string(),
            description: String::new(),
            location: "Brisbane".to_string(),
            date: Some("2024-06-10".to_string()),
            time: Some("08:00".to_string()),
            payment: 280.0,
            admin_stage: AdminStage::Open,
            cleaners_needed: Some(2),
            category: None,
            duration: None,
            area: None,
            status: Some(UrgencyTag::Urgent),
            secondary_payment: None,
        };

        let doc = new_job.to_document();
        assert_eq!(doc["scheduledAt"], json!("2024-06-10T08:00:00"));
        assert_eq!(doc["secondaryPayment"], Value::Null);
        assert_eq!(doc["cleanersNeeded"], json!(2));
    }

    #[test]
    fn new_job_without_time_has_no_combined_timestamp() {
        let new_job = NewJob {
            title: "Bond clean".to_string(),
            description: String::new(),
            location: String::new(),
            date: Some("2024-06-10".to_string()),
            time: None,
            payment: 0.0,
            admin_stage: AdminStage::Open,
            cleaners_needed: None,
            category: None,
            duration: None,
            area: None,
            status: None,
            secondary_payment: None,
        };
        assert!(new_job.to_document().get("scheduledAt").is_none());
    }

    #[test]
    fn patch_merges_only_provided_fields() {
        let stored = json!({
            "title": "Original",
            "description": "Keep me",
            "payment": 100,
            "adminStage": "Open"
        });

        let patch = JobPatch {
            title: Some("Renamed".to_string()),
            ..JobPatch::default()
        };
        let updated = patch.apply_to(&stored);

        assert_eq!(updated["title"], json!("Renamed"));
        assert_eq!(updated["description"], json!("Keep me"));
        assert_eq!(updated["payment"], json!(100));
    }

    #[test]
    fn patch_rederives_timestamp_when_time_changes() {
        let stored = json!({
            "title": "Clean",
            "date": "2024-06-10",
            "time": "08:00",
            "scheduledAt": "2024-06-10T08:00:00"
        });

        let patch = JobPatch {
            time: Some("14:30".to_string()),
            ..JobPatch::default()
        };
        let updated = patch.apply_to(&stored);
        assert_eq!(updated["scheduledAt"], json!("2024-06-10T14:30:00"));
    }

    #[test]
    fn patch_clears_secondary_payment_when_absent() {
        let stored = json!({ "title": "Clean", "secondaryPayment": 50 });
        let updated = JobPatch::default().apply_to(&stored);
        assert_eq!(updated["secondaryPayment"], Value::Null);
    }

    #[test]
    fn patch_upgrades_legacy_document_before_merging() {
        let stored = json!({ "projectName": "Old name", "payment": "90" });
        let patch = JobPatch {
            location: Some("Perth".to_string()),
            ..JobPatch::default()
        };
        let updated = patch.apply_to(&stored);

        assert_eq!(updated["title"], json!("Old name"));
        assert!(updated.get("projectName").is_none());
        assert_eq!(updated["location"], json!("Perth"));
        assert_eq!(updated["schemaVersion"], json!(3));
    }

    #[test]
    fn split_timestamp_handles_rfc3339() {
        let (date, time) = split_timestamp("2024-03-08T09:30:00Z").unwrap();
        assert_eq!(date, "2024-03-08");
        assert_eq!(time, "09:30");
        assert!(split_timestamp("next tuesday").is_none());
    }
}
