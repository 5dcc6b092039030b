//! Data access layer: create/read/list/update per entity over the document store.
//!
//! Every per-user operation takes an [`Owner`], stamps it into writes and
//! filters reads by it. `jobs` is the only global collection.

pub mod applications;
pub mod coaching;
pub mod cvs;
pub mod handlers;
pub mod jobs;
pub mod users;

use anyhow::anyhow;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use crate::errors::AppError;
use crate::identity::Owner;
use crate::schema::ValidationError;
use crate::store::{Collection, Document, DocumentStore, Filter, StoreError};

/// Returns the payload object with `uid` set to the caller. Client-supplied
/// ids are dropped; a foreign `uid` is refused.
pub(crate) fn owned_payload(payload: Value, owner: &Owner) -> Result<Value, AppError> {
    let Value::Object(mut fields) = payload else {
        return Err(ValidationError::single("$", "must be a JSON object").into());
    };
    match fields.get("uid") {
        None | Some(Value::Null) => {
            fields.insert("uid".to_string(), Value::String(owner.uid().to_string()));
        }
        Some(Value::String(uid)) if uid == owner.uid() => {}
        Some(_) => {
            warn!(uid = %owner.uid(), "Rejected write carrying another owner's uid");
            return Err(AppError::Forbidden);
        }
    }
    fields.remove("id");
    Ok(Value::Object(fields))
}

/// Serializes a record into stored fields, without its `id`.
pub(crate) fn to_fields<T: Serialize>(record: &T) -> Result<Map<String, Value>, AppError> {
    match serde_json::to_value(record).map_err(StoreError::from)? {
        Value::Object(mut fields) => {
            fields.remove("id");
            Ok(fields)
        }
        _ => Err(AppError::Internal(anyhow!(
            "record did not serialize to an object"
        ))),
    }
}

fn owned_by(doc: &Document, owner: &Owner) -> bool {
    doc.data.get("uid").and_then(Value::as_str) == Some(owner.uid())
}

pub(crate) async fn list_owned<T: DeserializeOwned>(
    store: &dyn DocumentStore,
    collection: Collection,
    owner: &Owner,
) -> Result<Vec<T>, AppError> {
    let filters = [Filter::Eq("uid", Value::String(owner.uid().to_string()))];
    let docs = store.query(collection, &filters).await?;
    docs.into_iter()
        .map(|doc| doc.into_record().map_err(AppError::from))
        .collect()
}

/// Another owner's document is reported as missing.
pub(crate) async fn get_owned<T: DeserializeOwned>(
    store: &dyn DocumentStore,
    collection: Collection,
    owner: &Owner,
    id: &str,
) -> Result<T, AppError> {
    let doc = store
        .get(collection, id)
        .await?
        .filter(|doc| owned_by(doc, owner))
        .ok_or_else(|| AppError::NotFound(format!("{} {id} not found", collection.name())))?;
    Ok(doc.into_record()?)
}

/// Create-or-merge the document keyed by the owner's uid. `stamp` sees the
/// stored fields (empty when absent) before the write.
pub(crate) async fn upsert_keyed<T>(
    store: &dyn DocumentStore,
    collection: Collection,
    owner: &Owner,
    mut record: T,
    stamp: impl FnOnce(&mut T, &Map<String, Value>),
) -> Result<T, AppError>
where
    T: Serialize + DeserializeOwned,
{
    let mut merged = store
        .get(collection, owner.uid())
        .await?
        .map(|doc| doc.data)
        .unwrap_or_default();
    stamp(&mut record, &merged);

    let fields = to_fields(&record)?;
    store.merge(collection, owner.uid(), fields.clone()).await?;

    merged.extend(fields);
    Ok(serde_json::from_value(Value::Object(merged)).map_err(StoreError::from)?)
}

pub(crate) async fn get_keyed<T: DeserializeOwned>(
    store: &dyn DocumentStore,
    collection: Collection,
    owner: &Owner,
) -> Result<Option<T>, AppError> {
    store
        .get(collection, owner.uid())
        .await?
        .map(|doc| doc.into_record().map_err(AppError::from))
        .transpose()
}

#[cfg(test)]
pub(crate) mod testing {
    use std::io::BufWriter;

    use printpdf::{BuiltinFont, Mm, PdfDocument};

    use crate::identity::{Owner, Session};

    /// A one-page A4 PDF containing `text` in Helvetica.
    pub fn sample_pdf(text: &str) -> Vec<u8> {
        let (doc, page, layer) = PdfDocument::new("CV", Mm(210.0), Mm(297.0), "Layer 1");
        let font = doc.add_builtin_font(BuiltinFont::Helvetica).unwrap();
        doc.get_page(page)
            .get_layer(layer)
            .use_text(text, 12.0, Mm(20.0), Mm(270.0), &font);

        let mut out = BufWriter::new(Vec::new());
        doc.save(&mut out).unwrap();
        out.into_inner().unwrap()
    }

    pub fn owner(uid: &str) -> Owner {
        Session {
            uid: uid.to_string(),
            email: None,
            id_token: format!("token-{uid}"),
            refresh_token: None,
            expires_in: None,
        }
        .owner()
    }
}
