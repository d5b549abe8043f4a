//! Document filter and update evaluation.
//!
//! A small subset of the MongoDB query language, enough for the in-memory
//! backend to behave like the real server on the filters and updates the
//! connector forwards.

use std::cmp::Ordering;

use bson::{Bson, Document};

use super::{Result, StoreError};

/// Returns whether `document` satisfies every entry of `filter`.
///
/// Supports top-level `$and`/`$or`, dotted paths, plain equality, and the
/// comparison operators `$eq`, `$ne`, `$gt`, `$gte`, `$lt`, `$lte`, `$in`,
/// `$nin`, `$exists`. Against an array field, equality and the ordering
/// operators match when any element does.
///
/// # Examples
///
/// ```
/// use bson::doc;
/// use docbridge_core::store::matches;
///
/// let user = doc! { "name": "ada", "age": 36, "address": { "city": "London" } };
///
/// assert!(matches(&user, &doc! { "name": "ada" }).unwrap());
/// assert!(matches(&user, &doc! { "age": { "$gte": 30 } }).unwrap());
/// assert!(matches(&user, &doc! { "address.city": "London" }).unwrap());
/// assert!(!matches(&user, &doc! { "age": { "$lt": 30 } }).unwrap());
/// ```
pub fn matches(document: &Document, filter: &Document) -> Result<bool> {
    for (key, expected) in filter {
        let matched = match key.as_str() {
            "$and" => all_match(document, expected)?,
            "$or" => any_match(document, expected)?,
            op if op.starts_with('$') => {
                return Err(StoreError::QueryFailed(format!(
                    "unknown top level operator: {op}"
                )))
            }
            path => field_matches(lookup(document, path), expected)?,
        };
        if !matched {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Applies `$set`, `$unset` and `$inc` modifiers to a copy of `document`.
///
/// Replacement documents (no `$` operators) are refused, as is any change
/// to `_id`.
pub fn apply_update(document: &Document, update: &Document) -> Result<Document> {
    if update.keys().any(|key| !key.starts_with('$')) {
        return Err(StoreError::QueryFailed(
            "update document requires atomic operators".to_string(),
        ));
    }

    let mut updated = document.clone();
    for (op, arg) in update {
        let Bson::Document(fields) = arg else {
            return Err(StoreError::QueryFailed(format!(
                "modifier {op} expects a document"
            )));
        };

        for (path, value) in fields {
            guard_immutable_id(document, path, op, value)?;
            match op.as_str() {
                "$set" => set_path(&mut updated, path, value.clone())?,
                "$unset" => remove_path(&mut updated, path),
                "$inc" => {
                    let current = lookup(&updated, path).cloned();
                    let next = match current {
                        None => numeric(value)?.clone(),
                        Some(current) => add(&current, numeric(value)?, path)?,
                    };
                    set_path(&mut updated, path, next)?;
                }
                _ => {
                    return Err(StoreError::QueryFailed(format!("unknown modifier: {op}")));
                }
            }
        }
    }
    Ok(updated)
}

/// Builds the starting document for an upsert from the equality entries of
/// a filter.
///
/// Fails when two entries address the same path, e.g. `a` and `a.b`.
pub fn upsert_seed(filter: &Document) -> Result<Document> {
    let mut seed = Document::new();
    for (key, value) in filter {
        if key.starts_with('$') {
            continue;
        }
        let value = match value {
            Bson::Document(ops) if is_operator_document(ops) => match ops.get("$eq") {
                Some(eq) => eq.clone(),
                None => continue,
            },
            other => other.clone(),
        };
        if lookup(&seed, key).is_some() {
            return Err(StoreError::QueryFailed(format!(
                "cannot infer query fields to set, path '{key}' is matched twice"
            )));
        }
        set_path(&mut seed, key, value).map_err(|_| {
            StoreError::QueryFailed(format!(
                "cannot infer query fields to set, path '{key}' conflicts with an earlier entry"
            ))
        })?;
    }
    Ok(seed)
}

fn all_match(document: &Document, clauses: &Bson) -> Result<bool> {
    for clause in clause_list(clauses)? {
        if !matches(document, clause)? {
            return Ok(false);
        }
    }
    Ok(true)
}

fn any_match(document: &Document, clauses: &Bson) -> Result<bool> {
    for clause in clause_list(clauses)? {
        if matches(document, clause)? {
            return Ok(true);
        }
    }
    Ok(false)
}

fn clause_list(clauses: &Bson) -> Result<Vec<&Document>> {
    let Bson::Array(items) = clauses else {
        return Err(StoreError::QueryFailed(
            "$and/$or expect an array".to_string(),
        ));
    };
    items
        .iter()
        .map(|item| match item {
            Bson::Document(clause) => Ok(clause),
            _ => Err(StoreError::QueryFailed(
                "$and/$or entries must be documents".to_string(),
            )),
        })
        .collect()
}

fn field_matches(field: Option<&Bson>, expected: &Bson) -> Result<bool> {
    match expected {
        Bson::Document(ops) if is_operator_document(ops) => {
            for (op, arg) in ops {
                if !evaluate_operator(field, op, arg)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        _ => Ok(field_equals(field, expected)),
    }
}

fn evaluate_operator(field: Option<&Bson>, op: &str, arg: &Bson) -> Result<bool> {
    let ordered = |wanted: &[Ordering]| {
        let hit = |value: &Bson| compare(value, arg).is_some_and(|ord| wanted.contains(&ord));
        match field {
            None => false,
            Some(Bson::Array(items)) if !matches!(arg, Bson::Array(_)) => items.iter().any(hit),
            Some(value) => hit(value),
        }
    };

    match op {
        "$eq" => Ok(field_equals(field, arg)),
        "$ne" => Ok(!field_equals(field, arg)),
        "$gt" => Ok(ordered(&[Ordering::Greater])),
        "$gte" => Ok(ordered(&[Ordering::Greater, Ordering::Equal])),
        "$lt" => Ok(ordered(&[Ordering::Less])),
        "$lte" => Ok(ordered(&[Ordering::Less, Ordering::Equal])),
        "$in" => in_list(field, arg),
        "$nin" => in_list(field, arg).map(|found| !found),
        "$exists" => Ok(field.is_some() == truthy(arg)),
        _ => Err(StoreError::QueryFailed(format!("unknown operator: {op}"))),
    }
}

fn in_list(field: Option<&Bson>, arg: &Bson) -> Result<bool> {
    let Bson::Array(candidates) = arg else {
        return Err(StoreError::QueryFailed("$in needs an array".to_string()));
    };
    Ok(candidates
        .iter()
        .any(|candidate| field_equals(field, candidate)))
}

/// Equality with array-contains semantics: a scalar matches an array field
/// holding it.
fn field_equals(field: Option<&Bson>, expected: &Bson) -> bool {
    match field {
        None => matches!(expected, Bson::Null),
        Some(Bson::Array(items)) if !matches!(expected, Bson::Array(_)) => {
            items.iter().any(|item| values_equal(item, expected))
        }
        Some(value) => values_equal(value, expected),
    }
}

fn values_equal(a: &Bson, b: &Bson) -> bool {
    compare(a, b) == Some(Ordering::Equal) || a == b
}

fn compare(a: &Bson, b: &Bson) -> Option<Ordering> {
    if let (Some(x), Some(y)) = (as_f64(a), as_f64(b)) {
        return x.partial_cmp(&y);
    }
    match (a, b) {
        (Bson::String(x), Bson::String(y)) => Some(x.cmp(y)),
        (Bson::ObjectId(x), Bson::ObjectId(y)) => Some(x.cmp(y)),
        (Bson::DateTime(x), Bson::DateTime(y)) => Some(x.cmp(y)),
        (Bson::Boolean(x), Bson::Boolean(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

fn as_f64(value: &Bson) -> Option<f64> {
    match value {
        Bson::Int32(v) => Some(f64::from(*v)),
        Bson::Int64(v) => Some(*v as f64),
        Bson::Double(v) => Some(*v),
        _ => None,
    }
}

fn numeric(value: &Bson) -> Result<&Bson> {
    match as_f64(value) {
        Some(_) => Ok(value),
        None => Err(StoreError::QueryFailed(
            "cannot increment with a non-numeric argument".to_string(),
        )),
    }
}

fn add(a: &Bson, b: &Bson, path: &str) -> Result<Bson> {
    let overflow = || {
        StoreError::QueryFailed(format!(
            "integer overflow applying $inc to field '{path}'"
        ))
    };
    match (a, b) {
        (Bson::Int32(x), Bson::Int32(y)) => Ok(x
            .checked_add(*y)
            .map(Bson::Int32)
            .unwrap_or_else(|| Bson::Int64(i64::from(*x) + i64::from(*y)))),
        (Bson::Int32(x), Bson::Int64(y)) | (Bson::Int64(y), Bson::Int32(x)) => i64::from(*x)
            .checked_add(*y)
            .map(Bson::Int64)
            .ok_or_else(overflow),
        (Bson::Int64(x), Bson::Int64(y)) => {
            x.checked_add(*y).map(Bson::Int64).ok_or_else(overflow)
        }
        _ => match (as_f64(a), as_f64(b)) {
            (Some(x), Some(y)) => Ok(Bson::Double(x + y)),
            _ => Err(StoreError::QueryFailed(format!(
                "cannot apply $inc to non-numeric field '{path}'"
            ))),
        },
    }
}

fn truthy(value: &Bson) -> bool {
    match value {
        Bson::Boolean(b) => *b,
        Bson::Null => false,
        other => as_f64(other).is_none_or(|n| n != 0.0),
    }
}

fn is_operator_document(document: &Document) -> bool {
    !document.is_empty() && document.keys().all(|key| key.starts_with('$'))
}

fn guard_immutable_id(current: &Document, path: &str, op: &str, value: &Bson) -> Result<()> {
    if path != "_id" {
        return Ok(());
    }
    let unchanged = op == "$set" && current.get("_id") == Some(value);
    if unchanged {
        return Ok(());
    }
    Err(StoreError::QueryFailed(
        "the field '_id' is immutable".to_string(),
    ))
}

fn lookup<'a>(document: &'a Document, path: &str) -> Option<&'a Bson> {
    match path.split_once('.') {
        None => document.get(path),
        Some((head, rest)) => match document.get(head)? {
            Bson::Document(inner) => lookup(inner, rest),
            _ => None,
        },
    }
}

fn set_path(document: &mut Document, path: &str, value: Bson) -> Result<()> {
    match path.split_once('.') {
        None => {
            document.insert(path, value);
            Ok(())
        }
        Some((head, rest)) => {
            if !document.contains_key(head) {
                document.insert(head, Document::new());
            }
            match document.get_mut(head) {
                Some(Bson::Document(inner)) => set_path(inner, rest, value),
                _ => Err(StoreError::QueryFailed(format!(
                    "cannot create field '{rest}' inside non-document '{head}'"
                ))),
            }
        }
    }
}

fn remove_path(document: &mut Document, path: &str) {
    match path.split_once('.') {
        None => {
            document.remove(path);
        }
        Some((head, rest)) => {
            if let Some(Bson::Document(inner)) = document.get_mut(head) {
                remove_path(inner, rest);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;
    use bson::oid::ObjectId;

    fn sample() -> Document {
        doc! {
            "_id": ObjectId::parse_str("65a1f0c2e4b0a1b2c3d4e5f6").unwrap(),
            "name": "ada",
            "age": 36,
            "score": 9.5,
            "tags": ["math", "engines"],
            "address": { "city": "London", "zip": "N1" },
        }
    }

    #[test]
    fn test_plain_equality() {
        let doc = sample();
        assert!(matches(&doc, &doc! { "name": "ada", "age": 36 }).unwrap());
        assert!(!matches(&doc, &doc! { "name": "grace" }).unwrap());
    }

    #[test]
    fn test_numeric_equality_across_types() {
        let doc = sample();
        assert!(matches(&doc, &doc! { "age": 36_i64 }).unwrap());
        assert!(matches(&doc, &doc! { "age": 36.0 }).unwrap());
    }

    #[test]
    fn test_missing_field_matches_null() {
        let doc = sample();
        assert!(matches(&doc, &doc! { "nickname": Bson::Null }).unwrap());
        assert!(!matches(&doc, &doc! { "name": Bson::Null }).unwrap());
    }

    #[test]
    fn test_array_contains() {
        let doc = sample();
        assert!(matches(&doc, &doc! { "tags": "math" }).unwrap());
        assert!(!matches(&doc, &doc! { "tags": "poetry" }).unwrap());
        assert!(matches(&doc, &doc! { "tags": ["math", "engines"] }).unwrap());
    }

    #[test]
    fn test_comparison_operators() {
        let doc = sample();
        assert!(matches(&doc, &doc! { "age": { "$gt": 30, "$lte": 36 } }).unwrap());
        assert!(!matches(&doc, &doc! { "age": { "$gt": 36 } }).unwrap());
        assert!(matches(&doc, &doc! { "score": { "$lt": 10 } }).unwrap());
        assert!(matches(&doc, &doc! { "name": { "$ne": "grace" } }).unwrap());
        assert!(!matches(&doc, &doc! { "missing": { "$gt": 0 } }).unwrap());
    }

    #[test]
    fn test_in_and_nin() {
        let doc = sample();
        assert!(matches(&doc, &doc! { "name": { "$in": ["ada", "grace"] } }).unwrap());
        assert!(matches(&doc, &doc! { "name": { "$nin": ["grace"] } }).unwrap());
        assert!(matches(&doc, &doc! { "name": { "$in": "ada" } }).is_err());
    }

    #[test]
    fn test_exists() {
        let doc = sample();
        assert!(matches(&doc, &doc! { "name": { "$exists": true } }).unwrap());
        assert!(matches(&doc, &doc! { "nickname": { "$exists": false } }).unwrap());
        assert!(!matches(&doc, &doc! { "nickname": { "$exists": 1 } }).unwrap());
    }

    #[test]
    fn test_logical_operators() {
        let doc = sample();
        let either = doc! { "$or": [{ "name": "grace" }, { "age": 36 }] };
        assert!(matches(&doc, &either).unwrap());
        let both = doc! { "$and": [{ "name": "grace" }, { "age": 36 }] };
        assert!(!matches(&doc, &both).unwrap());
    }

    #[test]
    fn test_unknown_operators_fail() {
        let doc = sample();
        assert!(matches(&doc, &doc! { "$where": "true" }).is_err());
        assert!(matches(&doc, &doc! { "age": { "$near": 3 } }).is_err());
    }

    #[test]
    fn test_embedded_document_matches_literally() {
        let doc = sample();
        let exact = doc! { "address": { "city": "London", "zip": "N1" } };
        assert!(matches(&doc, &exact).unwrap());
        let partial = doc! { "address": { "city": "London" } };
        assert!(!matches(&doc, &partial).unwrap());
    }

    #[test]
    fn test_set_and_unset() {
        let doc = sample();
        let update = doc! {
            "$set": { "name": "Ada Lovelace", "address.zip": "W1" },
            "$unset": { "tags": "" },
        };
        let updated = apply_update(&doc, &update).unwrap();

        assert_eq!(updated.get_str("name").unwrap(), "Ada Lovelace");
        assert_eq!(
            updated.get_document("address").unwrap().get_str("zip").unwrap(),
            "W1"
        );
        assert!(!updated.contains_key("tags"));
        // source untouched
        assert_eq!(doc.get_str("name").unwrap(), "ada");
    }

    #[test]
    fn test_set_creates_nested_documents() {
        let updated = apply_update(&doc! {}, &doc! { "$set": { "a.b.c": 1 } }).unwrap();
        assert_eq!(updated, doc! { "a": { "b": { "c": 1 } } });
    }

    #[test]
    fn test_set_through_scalar_fails() {
        let result = apply_update(&sample(), &doc! { "$set": { "name.first": "a" } });
        assert!(matches!(result, Err(StoreError::QueryFailed(_))));
    }

    #[test]
    fn test_inc() {
        let doc = sample();
        let updated = apply_update(&doc, &doc! { "$inc": { "age": 1, "visits": 2 } }).unwrap();
        assert_eq!(updated.get("age"), Some(&Bson::Int32(37)));
        assert_eq!(updated.get("visits"), Some(&Bson::Int32(2)));

        let updated = apply_update(&doc, &doc! { "$inc": { "score": 0.5 } }).unwrap();
        assert_eq!(updated.get("score"), Some(&Bson::Double(10.0)));
    }

    #[test]
    fn test_inc_widens_on_overflow() {
        let doc = doc! { "n": i32::MAX };
        let updated = apply_update(&doc, &doc! { "$inc": { "n": 1 } }).unwrap();
        assert_eq!(updated.get("n"), Some(&Bson::Int64(i64::from(i32::MAX) + 1)));
    }

    #[test]
    fn test_inc_reports_int64_overflow() {
        let doc = doc! { "n": i64::MAX };
        let result = apply_update(&doc, &doc! { "$inc": { "n": 1 } });
        assert_eq!(
            result,
            Err(StoreError::QueryFailed(
                "integer overflow applying $inc to field 'n'".to_string()
            ))
        );
    }

    #[test]
    fn test_inc_non_numeric_fails() {
        let result = apply_update(&sample(), &doc! { "$inc": { "name": 1 } });
        assert_eq!(
            result,
            Err(StoreError::QueryFailed(
                "cannot apply $inc to non-numeric field 'name'".to_string()
            ))
        );
        assert!(apply_update(&sample(), &doc! { "$inc": { "age": "one" } }).is_err());
    }

    #[test]
    fn test_replacement_document_rejected() {
        let result = apply_update(&sample(), &doc! { "name": "grace" });
        assert_eq!(
            result,
            Err(StoreError::QueryFailed(
                "update document requires atomic operators".to_string()
            ))
        );
    }

    #[test]
    fn test_id_is_immutable() {
        let doc = sample();
        let other = ObjectId::new();
        assert!(apply_update(&doc, &doc! { "$set": { "_id": other } }).is_err());
        assert!(apply_update(&doc, &doc! { "$unset": { "_id": "" } }).is_err());

        let same = doc.get("_id").cloned().unwrap();
        assert!(apply_update(&doc, &doc! { "$set": { "_id": same } }).is_ok());
    }

    #[test]
    fn test_upsert_seed_keeps_equality_fields() {
        let filter = doc! {
            "email": "ada@example.com",
            "age": { "$gt": 30 },
            "role": { "$eq": "admin" },
            "profile.lang": "en",
            "$or": [{ "a": 1 }],
        };
        let seed = upsert_seed(&filter).unwrap();
        assert_eq!(
            seed,
            doc! {
                "email": "ada@example.com",
                "role": "admin",
                "profile": { "lang": "en" },
            }
        );
    }

    #[test]
    fn test_upsert_seed_rejects_conflicting_paths() {
        let scalar_first = upsert_seed(&doc! { "a": 1, "a.b": 2 });
        assert!(matches!(scalar_first, Err(StoreError::QueryFailed(_))));

        let nested_first = upsert_seed(&doc! { "a.b": 2, "a": 1 });
        assert!(matches!(nested_first, Err(StoreError::QueryFailed(_))));
    }

    #[test]
    fn test_ordering_operators_check_array_elements() {
        let doc = doc! { "scores": [3, 8, 12] };
        assert!(matches(&doc, &doc! { "scores": { "$gt": 10 } }).unwrap());
        assert!(matches(&doc, &doc! { "scores": { "$lte": 3 } }).unwrap());
        assert!(!matches(&doc, &doc! { "scores": { "$lt": 3 } }).unwrap());
        assert!(!matches(&doc, &doc! { "scores": { "$gte": 13 } }).unwrap());
    }
}
