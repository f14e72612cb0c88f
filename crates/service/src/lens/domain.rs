use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A lens record: any JSON object, identified by its string `id` field.
/// Field order is kept as received.
pub type Lens = Map<String, Value>;

/// Name of the identifying attribute.
pub const ID_FIELD: &str = "id";

/// On-disk envelope: `{ "lenses": [...] }`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PersistedDocument {
    #[serde(default)]
    pub lenses: Vec<Lens>,
}

/// Borrowed form used when writing, so saving never clones the collection.
#[derive(Serialize)]
pub(crate) struct PersistedDocumentRef<'a> {
    pub lenses: &'a [Lens],
}

/// The record's `id`, when present and a string.
pub fn lens_id(lens: &Lens) -> Option<&str> {
    lens.get(ID_FIELD).and_then(Value::as_str)
}
