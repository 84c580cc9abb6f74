use divan::Bencher;
use serde_json::json;
use validate_json::{CheckMode, SchemaRegistry, ValidationOptions, Validator, Value};

fn main() {
    divan::main();
}

fn order_schema() -> Value {
    Value::from(json!({
        "definitions": {
            "line": {
                "type": "object",
                "required": ["sku", "qty"],
                "properties": {
                    "sku": {"type": "string", "pattern": "^[A-Z]{3}-[0-9]{4}$"},
                    "qty": {"type": "integer", "minimum": 1},
                    "price": {"type": "number", "multipleOf": 0.01}
                },
                "additionalProperties": false
            }
        },
        "type": "object",
        "properties": {
            "id": {"type": "integer"},
            "placed": {"type": "string", "format": "date-time"},
            "tags": {"type": "array", "items": {"type": "string"}, "uniqueItems": true},
            "lines": {"type": "array", "items": {"$ref": "#/definitions/line"}}
        }
    }))
}

fn order(lines: usize) -> Value {
    let lines: Vec<_> = (0..lines)
        .map(|i| json!({"sku": format!("ABC-{:04}", i % 10_000), "qty": i + 1, "price": 9.99}))
        .collect();
    Value::from(json!({
        "id": 7,
        "placed": "2024-05-01T12:00:00Z",
        "tags": ["a", "b", "c"],
        "lines": lines
    }))
}

#[divan::bench(args = [1, 100, 1000])]
fn validate_order(bencher: Bencher, lines: usize) {
    let validator = Validator::default();
    let schema = order_schema();
    let instance = order(lines);

    bencher.bench_local(|| validator.validate(&instance, &schema).unwrap());
}

#[divan::bench]
fn validate_with_type_cast(bencher: Bencher) {
    let validator =
        Validator::new(ValidationOptions::default().with_check_mode(CheckMode::TypeCast));
    let schema = order_schema();
    let instance = Value::from(json!({
        "id": "7",
        "lines": [{"sku": "ABC-0001", "qty": "3"}]
    }));

    bencher.bench_local(|| validator.validate(&instance, &schema).unwrap());
}

#[divan::bench]
fn validate_across_registry(bencher: Bencher) {
    let registry = SchemaRegistry::new().with_document(
        "http://example.com/order.json",
        order_schema(),
    );
    let validator = Validator::default().with_resolver(std::sync::Arc::new(registry));
    let schema = Value::from(json!({"$ref": "http://example.com/order.json"}));
    let instance = order(100);

    bencher.bench_local(|| validator.validate(&instance, &schema).unwrap());
}

#[divan::bench]
fn decode_document(bencher: Bencher) {
    let text = serde_json::to_string(&json!({
        "id": 7,
        "lines": (0..500).map(|i| json!({"sku": "ABC-0001", "qty": i})).collect::<Vec<_>>()
    }))
    .unwrap();

    bencher.bench_local(|| serde_json::from_str::<Value>(&text).unwrap());
}
