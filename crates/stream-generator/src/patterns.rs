//! Built-in data patterns for common field names.

use crate::DataPattern;
use serde_json::json;
use std::collections::BTreeMap;

fn list(values: &[&str]) -> DataPattern {
    DataPattern::List {
        values: values.iter().map(|v| json!(v)).collect(),
    }
}

fn range(min: f64, max: f64) -> DataPattern {
    DataPattern::Range { min, max }
}

fn format(format: &str) -> DataPattern {
    DataPattern::Format {
        format: format.to_string(),
    }
}

/// Patterns for field names that show up across e-commerce, user,
/// geographic, system, log, and financial data sets. Used by the
/// `generate` command so schema-less output still looks plausible.
pub fn builtin_patterns() -> BTreeMap<String, DataPattern> {
    let mut patterns = BTreeMap::new();

    // E-commerce
    patterns.insert("product_id".to_string(), format("PROD-{id}"));
    patterns.insert("order_id".to_string(), format("ORD-{id}"));
    patterns.insert("sku".to_string(), format("SKU-{random}"));
    patterns.insert("price".to_string(), range(9.99, 999.99));
    patterns.insert(
        "category".to_string(),
        list(&["electronics", "clothing", "books", "home-garden", "sports", "toys", "automotive"]),
    );
    patterns.insert(
        "payment_method".to_string(),
        list(&["credit_card", "debit_card", "paypal", "bank_transfer", "cash", "crypto"]),
    );
    patterns.insert(
        "order_status".to_string(),
        list(&["pending", "confirmed", "processing", "shipped", "delivered", "cancelled", "refunded"]),
    );

    // Users and customers
    patterns.insert("user_id".to_string(), format("user_{id}"));
    patterns.insert("customer_id".to_string(), format("CUST-{id}"));
    patterns.insert("email".to_string(), format("email"));
    patterns.insert("phone".to_string(), format("phone"));
    patterns.insert("age".to_string(), range(18.0, 85.0));
    patterns.insert(
        "plan_type".to_string(),
        list(&["free", "basic", "premium", "enterprise", "trial"]),
    );
    patterns.insert(
        "subscription_status".to_string(),
        list(&["active", "inactive", "cancelled", "expired", "pending"]),
    );

    // Geography
    patterns.insert(
        "country".to_string(),
        list(&["USA", "Canada", "UK", "Germany", "France", "Australia", "Japan", "Brazil", "India", "Mexico"]),
    );
    patterns.insert(
        "city".to_string(),
        list(&[
            "New York", "Los Angeles", "Chicago", "Houston", "Phoenix", "Philadelphia",
            "San Antonio", "San Diego", "Dallas", "San Jose", "Austin", "Seattle",
            "Denver", "Boston", "Nashville", "Detroit",
        ]),
    );
    patterns.insert(
        "timezone".to_string(),
        list(&[
            "UTC", "America/New_York", "America/Chicago", "America/Denver",
            "America/Los_Angeles", "Europe/London", "Europe/Paris", "Asia/Tokyo",
        ]),
    );

    // Technical and system
    patterns.insert("ip_address".to_string(), format("ip"));
    patterns.insert("mac_address".to_string(), format("mac"));
    patterns.insert("uuid".to_string(), format("uuid"));
    patterns.insert("session_id".to_string(), format("uuid"));
    patterns.insert("api_key".to_string(), format("api_key"));
    patterns.insert(
        "version".to_string(),
        list(&["v1.0.0", "v1.1.0", "v1.2.0", "v2.0.0", "v2.1.0", "v3.0.0"]),
    );
    patterns.insert(
        "browser".to_string(),
        list(&["Chrome", "Firefox", "Safari", "Edge", "Opera", "Mobile Safari"]),
    );
    patterns.insert(
        "os".to_string(),
        list(&["Windows", "macOS", "Linux", "iOS", "Android", "Ubuntu"]),
    );
    patterns.insert(
        "device_type".to_string(),
        list(&["desktop", "mobile", "tablet", "smart-tv", "wearable", "iot"]),
    );

    // Logs and events
    patterns.insert(
        "log_level".to_string(),
        list(&["DEBUG", "INFO", "WARN", "ERROR", "FATAL"]),
    );
    patterns.insert(
        "event_type".to_string(),
        list(&["user_login", "user_logout", "page_view", "click", "purchase", "search", "error", "api_call"]),
    );
    patterns.insert(
        "http_status".to_string(),
        DataPattern::List {
            values: vec![
                json!(200),
                json!(201),
                json!(400),
                json!(401),
                json!(403),
                json!(404),
                json!(500),
                json!(502),
                json!(503),
            ],
        },
    );
    patterns.insert("response_time".to_string(), range(10.0, 5000.0));

    // Financial
    patterns.insert("transaction_id".to_string(), format("TXN-{id}"));
    patterns.insert("account_number".to_string(), format("ACC-{id}"));
    patterns.insert("amount".to_string(), range(1.0, 10000.0));
    patterns.insert(
        "currency".to_string(),
        list(&["USD", "EUR", "GBP", "JPY", "CAD", "AUD", "CNY", "INR"]),
    );
    patterns.insert(
        "transaction_type".to_string(),
        list(&["debit", "credit", "transfer", "payment", "refund", "fee", "interest"]),
    );

    // Sensors
    patterns.insert("sensor_id".to_string(), format("SENSOR-{id}"));
    patterns.insert("temperature".to_string(), range(-20.0, 45.0));
    patterns.insert("humidity".to_string(), range(0.0, 100.0));
    patterns.insert("battery_level".to_string(), range(0.0, 100.0));

    patterns
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn covers_every_pattern_kind() {
        let patterns = builtin_patterns();
        assert!(matches!(patterns.get("city"), Some(DataPattern::List { .. })));
        assert!(matches!(patterns.get("price"), Some(DataPattern::Range { .. })));
        assert!(matches!(patterns.get("email"), Some(DataPattern::Format { .. })));
    }
}
