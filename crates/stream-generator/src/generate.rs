//! Record generation driven by a schema and name hints.

use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, NaiveTime, Utc};
use diff_core::{Field, FieldType, Record, RecordSource, Schema, SchemaError, SourceError};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::debug;

use crate::{DataPattern, GeneratorConfig};

/// Error building a generator.
#[derive(Debug, thiserror::Error)]
pub enum GeneratorError {
    /// The schema file could not be loaded
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// Synthetic record stream implementing [`RecordSource`].
///
/// Emits records one by one until `max_records` is reached (or forever
/// when zero), sleeping between records when a rate is configured.
pub struct StreamGenerator {
    /// Field list materialized once from the schema; the schema itself is
    /// immutable after construction.
    fields: Vec<(String, Field)>,
    patterns: BTreeMap<String, DataPattern>,
    rng: StdRng,
    emitted: u64,
    max_records: u64,
    interval: Option<Duration>,
    /// Reference time for datetime fields, truncated to the day so two
    /// generators with the same seed emit identical streams.
    base_time: DateTime<Utc>,
}

impl StreamGenerator {
    pub fn from_config(config: &GeneratorConfig) -> Result<Self, GeneratorError> {
        let schema = match &config.schema_path {
            Some(path) if !path.is_empty() => Schema::from_yaml_file(path)?,
            _ => default_schema(),
        };

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let interval = if config.records_per_second > 0.0 {
            Some(Duration::from_secs_f64(1.0 / config.records_per_second))
        } else {
            None
        };

        debug!(
            fields = schema.fields.len(),
            max_records = config.max_records,
            "stream generator ready"
        );

        Ok(Self {
            fields: schema.fields.into_iter().collect(),
            patterns: config.patterns.clone(),
            rng,
            emitted: 0,
            max_records: config.max_records,
            interval,
            base_time: Utc::now().date_naive().and_time(NaiveTime::MIN).and_utc(),
        })
    }

    fn generate_record(&mut self, record_id: u64) -> Record {
        let mut record = Record::new();
        // Take the field list so the value generators can borrow self
        // mutably for the rng.
        let fields = std::mem::take(&mut self.fields);
        for (name, field) in &fields {
            let value = self.generate_value(name, field.field_type, record_id);
            record.insert(name.clone(), value);
        }
        self.fields = fields;
        record
    }

    fn generate_value(&mut self, name: &str, field_type: FieldType, record_id: u64) -> Value {
        if let Some(pattern) = self.patterns.get(name).cloned() {
            return self.generate_from_pattern(&pattern, field_type, record_id);
        }

        match field_type {
            FieldType::Numeric => self.generate_numeric(name, record_id),
            FieldType::String | FieldType::Unknown => self.generate_string(name, record_id),
            FieldType::Datetime => self.generate_datetime(name),
            FieldType::Boolean => Value::Bool(self.rng.gen_bool(0.5)),
            FieldType::Object => self.generate_object(record_id),
            FieldType::Array => self.generate_array(name, record_id),
        }
    }

    fn generate_from_pattern(
        &mut self,
        pattern: &DataPattern,
        field_type: FieldType,
        record_id: u64,
    ) -> Value {
        match pattern {
            DataPattern::List { values } => {
                if values.is_empty() {
                    return Value::Null;
                }
                values[self.rng.gen_range(0..values.len())].clone()
            }
            DataPattern::Range { min, max } => {
                if field_type == FieldType::Numeric || field_type == FieldType::Unknown {
                    if max <= min {
                        json!(min)
                    } else {
                        json!(self.rng.gen_range(*min..*max))
                    }
                } else {
                    Value::String(min.to_string())
                }
            }
            DataPattern::Format { format } => self.generate_formatted(format, record_id),
        }
    }

    fn generate_numeric(&mut self, name: &str, record_id: u64) -> Value {
        if contains_any(name, &["id", "ID", "_id"]) {
            json!(record_id)
        } else if name.contains("age") {
            json!(self.rng.gen_range(18..98))
        } else if contains_any(name, &["price", "cost", "amount"]) {
            json!(self.rng.gen_range(0..100_000) as f64 / 100.0)
        } else if contains_any(name, &["count", "quantity"]) {
            json!(self.rng.gen_range(1..=1000))
        } else {
            json!(self.rng.gen_range(0..100_000) as f64 / 100.0)
        }
    }

    fn generate_string(&mut self, name: &str, record_id: u64) -> Value {
        if contains_any(name, &["email", "mail"]) {
            let domains = ["example.com", "test.com", "email.com", "domain.org"];
            let domain = domains[self.rng.gen_range(0..domains.len())];
            json!(format!("user{record_id}@{domain}"))
        } else if contains_any(name, &["name", "username", "user"]) {
            let names = [
                "Alice", "Bob", "Charlie", "David", "Eve", "Frank", "Grace", "Henry", "Ivy",
                "Jack",
            ];
            json!(names[self.rng.gen_range(0..names.len())])
        } else if contains_any(name, &["city", "location"]) {
            let cities = [
                "New York",
                "Los Angeles",
                "Chicago",
                "Houston",
                "Phoenix",
                "Philadelphia",
                "San Antonio",
                "San Diego",
                "Dallas",
                "San Jose",
            ];
            json!(cities[self.rng.gen_range(0..cities.len())])
        } else if contains_any(name, &["plan", "type", "category"]) {
            let plans = ["basic", "premium", "enterprise", "free", "standard", "deluxe"];
            json!(plans[self.rng.gen_range(0..plans.len())])
        } else if contains_any(name, &["status", "state"]) {
            let statuses = [
                "active",
                "inactive",
                "pending",
                "completed",
                "failed",
                "processing",
            ];
            json!(statuses[self.rng.gen_range(0..statuses.len())])
        } else {
            let len = 8 + self.rng.gen_range(0..16);
            json!(self.random_string(len))
        }
    }

    fn generate_datetime(&mut self, name: &str) -> Value {
        let now = self.base_time;
        if contains_any(name, &["created", "created_at", "created_date"]) {
            let days = self.rng.gen_range(0..365);
            json!((now - ChronoDuration::days(days)).to_rfc3339())
        } else if contains_any(name, &["updated", "modified", "last_"]) {
            let days = self.rng.gen_range(0..30);
            json!((now - ChronoDuration::days(days)).to_rfc3339())
        } else if contains_any(name, &["birth", "dob"]) {
            let days = self.rng.gen_range(18 * 365..80 * 365);
            json!((now - ChronoDuration::days(days)).format("%Y-%m-%d").to_string())
        } else {
            let days = self.rng.gen_range(0..180);
            json!((now - ChronoDuration::days(days)).to_rfc3339())
        }
    }

    fn generate_object(&mut self, record_id: u64) -> Value {
        let mut object = Record::new();
        let field_count = 2 + self.rng.gen_range(0..4);
        for i in 1..=field_count {
            let key = format!("field{i}");
            let value = self.generate_string(&key, record_id);
            object.insert(key, value);
        }
        Value::Object(object)
    }

    fn generate_array(&mut self, name: &str, record_id: u64) -> Value {
        let item_count = 1 + self.rng.gen_range(0..5);
        let items = (0..item_count)
            .map(|i| self.generate_string(name, record_id + i))
            .collect();
        Value::Array(items)
    }

    fn generate_formatted(&mut self, format: &str, record_id: u64) -> Value {
        match format {
            "email" => {
                let usernames = ["user", "test", "admin", "customer", "demo", "sample"];
                let domains = ["example.com", "test.com", "company.com", "email.org", "demo.net"];
                let username = usernames[self.rng.gen_range(0..usernames.len())];
                let domain = domains[self.rng.gen_range(0..domains.len())];
                json!(format!("{username}{record_id}@{domain}"))
            }
            "phone" => json!(format!(
                "+1-{:03}-{:03}-{:04}",
                200 + self.rng.gen_range(0..800),
                100 + self.rng.gen_range(0..900),
                self.rng.gen_range(0..10_000)
            )),
            "uuid" => json!(format!(
                "{:08x}-{:04x}-{:04x}-{:04x}-{:012x}",
                self.rng.gen::<u32>(),
                self.rng.gen::<u32>() & 0xffff,
                self.rng.gen::<u32>() & 0xffff,
                self.rng.gen::<u32>() & 0xffff,
                self.rng.gen::<u64>() & 0xffff_ffff_ffff
            )),
            "ip" => json!(format!(
                "{}.{}.{}.{}",
                10 + self.rng.gen_range(0..245),
                self.rng.gen_range(0..256),
                self.rng.gen_range(0..256),
                1 + self.rng.gen_range(0..254)
            )),
            "mac" => json!(format!(
                "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
                self.rng.gen::<u8>(),
                self.rng.gen::<u8>(),
                self.rng.gen::<u8>(),
                self.rng.gen::<u8>(),
                self.rng.gen::<u8>(),
                self.rng.gen::<u8>()
            )),
            "api_key" => json!(format!("ak_{}", self.random_string(32))),
            template if template.contains("{id}") => {
                json!(template.replace("{id}", &record_id.to_string()))
            }
            template if template.contains("{random}") => {
                let random = self.random_string(8);
                json!(template.replace("{random}", &random))
            }
            literal => json!(literal),
        }
    }

    fn random_string(&mut self, length: usize) -> String {
        const CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
        (0..length)
            .map(|_| CHARSET[self.rng.gen_range(0..CHARSET.len())] as char)
            .collect()
    }
}

#[async_trait]
impl RecordSource for StreamGenerator {
    async fn read(&mut self) -> Result<Option<Record>, SourceError> {
        if self.max_records > 0 && self.emitted >= self.max_records {
            return Ok(None);
        }
        if let Some(interval) = self.interval {
            tokio::time::sleep(interval).await;
        }

        self.emitted += 1;
        Ok(Some(self.generate_record(self.emitted)))
    }

    async fn close(&mut self) -> Result<(), SourceError> {
        Ok(())
    }
}

/// Demo schema used when no schema file is configured.
fn default_schema() -> Schema {
    let mut fields = BTreeMap::new();
    fields.insert("user_id".to_string(), Field::new(FieldType::Numeric));
    fields.insert("email".to_string(), Field::new(FieldType::String));
    fields.insert("age".to_string(), Field::new(FieldType::Numeric));
    fields.insert("city".to_string(), Field::new(FieldType::String));
    fields.insert("plan_type".to_string(), Field::new(FieldType::String));
    fields.insert("last_login".to_string(), Field::new(FieldType::Datetime));
    fields.insert("active".to_string(), Field::new(FieldType::Boolean));

    Schema {
        key: "user_id".to_string(),
        max_key_size: None,
        fields,
    }
}

fn contains_any(name: &str, hints: &[&str]) -> bool {
    hints.iter().any(|hint| name.contains(hint))
}
