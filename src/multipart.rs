//! multipart upload packing
//!
//! follows the graphql multipart request layout: an `operations` part with
//! the json request (uploads serialize as `null`), a `map` part pointing
//! each file part at the variable paths it fills, then one part per file.
//! files with byte-identical content share a single part.

use crate::error::{Error, Result};
use crate::request::Request;
use crate::upload::{sniff_content_type, Upload};
use crate::variables::{Shape, Variables};
use reqwest::multipart::{Form, Part};
use serde::ser::{Serialize, SerializeMap, Serializer};
use tracing::debug;

/// `map` part contents: part index -> variable paths, in part order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileMap(Vec<(String, Vec<String>)>);

impl FileMap {
    pub fn entries(&self) -> &[(String, Vec<String>)] {
        &self.0
    }

    pub fn paths(&self, index: &str) -> Option<&[String]> {
        self.0
            .iter()
            .find(|(key, _)| key == index)
            .map(|(_, paths)| paths.as_slice())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for FileMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (index, paths) in &self.0 {
            map.serialize_entry(index, paths)?;
        }
        map.end()
    }
}

/// one file part
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePart {
    /// part name, the decimal index
    pub name: String,
    /// trimmed file name; `None` when blank
    pub file_name: Option<String>,
    pub content_type: mime::Mime,
    pub content: Vec<u8>,
}

/// a packed multipart request body
#[derive(Debug, Clone)]
pub struct MultipartBody {
    /// json request envelope
    pub operations: String,
    pub map: FileMap,
    pub parts: Vec<FilePart>,
}

impl MultipartBody {
    /// assemble the reqwest form, parts in `operations`, `map`, files order
    pub fn into_form(self) -> Result<Form> {
        let map = serde_json::to_string(&self.map)?;
        let mut form = Form::new()
            .text("operations", self.operations)
            .text("map", map);
        for part in self.parts {
            let mut file = Part::bytes(part.content).mime_str(part.content_type.as_ref())?;
            if let Some(file_name) = part.file_name {
                file = file.file_name(file_name);
            }
            form = form.part(part.name, file);
        }
        Ok(form)
    }
}

struct Group<'a> {
    upload: &'a Upload,
    content: Vec<u8>,
    paths: Vec<String>,
}

/// pack `request` as a multipart body, reading every upload's content
///
/// any read failure aborts packing with a transport error.
pub async fn pack<V: Variables>(request: &Request<V>) -> Result<MultipartBody> {
    let operations = serde_json::to_string(request)?;

    let mut found = Vec::new();
    if let Some(variables) = &request.variables {
        collect_uploads(variables.shape(), "variables".to_string(), &mut found);
    }

    let mut groups: Vec<Group<'_>> = Vec::new();
    for (path, upload) in &found {
        let content = upload
            .read_content()
            .await
            .map_err(|err| Error::Transport {
                status: None,
                body: String::new(),
                message: format!("error reading file `{}`: {err}", upload.file_name()),
            })?;
        match groups.iter_mut().find(|group| group.content == content) {
            Some(group) => group.paths.push(path.clone()),
            None => groups.push(Group {
                upload: *upload,
                content,
                paths: vec![path.clone()],
            }),
        }
    }

    debug!(
        uploads = found.len(),
        parts = groups.len(),
        "packed multipart request"
    );

    let mut map = Vec::with_capacity(groups.len());
    let mut parts = Vec::with_capacity(groups.len());
    for (index, group) in groups.into_iter().enumerate() {
        let name = index.to_string();
        let file_name = group.upload.file_name().trim();
        map.push((name.clone(), group.paths));
        parts.push(FilePart {
            name,
            file_name: (!file_name.is_empty()).then(|| file_name.to_string()),
            content_type: sniff_content_type(&group.content),
            content: group.content,
        });
    }

    Ok(MultipartBody {
        operations,
        map: FileMap(map),
        parts,
    })
}

fn collect_uploads<'a>(shape: Shape<'a>, path: String, out: &mut Vec<(String, &'a Upload)>) {
    match shape {
        Shape::Leaf => {}
        Shape::Upload(upload) => out.push((path, upload)),
        Shape::Sequence(items) => {
            for (index, item) in items.into_iter().enumerate() {
                collect_uploads(item, format!("{path}.{index}"), out);
            }
        }
        Shape::Record(fields) => {
            for (key, field) in fields {
                collect_uploads(field, format!("{path}.{key}"), out);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variables::{Optional, ToShape};
    use serde::Serialize;

    #[derive(Serialize)]
    struct AttachVariables {
        id: String,
        files: Vec<Upload>,
        #[serde(default, skip_serializing_if = "Optional::is_absent")]
        note: Optional<Upload>,
    }

    impl ToShape for AttachVariables {
        fn shape(&self) -> Shape<'_> {
            Shape::Record(vec![
                ("id", self.id.shape()),
                ("files", self.files.shape()),
                ("note", self.note.shape()),
            ])
        }
    }

    fn request(files: Vec<Upload>, note: Optional<Upload>) -> Request<AttachVariables> {
        Request::new(
            "mutation Attach($id: ID!, $files: [Upload!]!, $note: Upload) { attach(id: $id, files: $files, note: $note) { id } }",
            "Attach",
            Some(AttachVariables {
                id: "1".to_string(),
                files,
                note,
            }),
        )
        .with_multipart_upload()
    }

    #[tokio::test]
    #[cfg_attr(miri, ignore)]
    async fn test_identical_content_shares_a_part() {
        let body = pack(&request(
            vec![
                Upload::from_bytes("a.txt", b"same".to_vec()),
                Upload::from_bytes("b.txt", b"same".to_vec()),
            ],
            Optional::Absent,
        ))
        .await
        .unwrap();

        assert_eq!(body.parts.len(), 1);
        assert_eq!(body.parts[0].file_name.as_deref(), Some("a.txt"));
        assert_eq!(
            body.map.paths("0").unwrap(),
            &["variables.files.0".to_string(), "variables.files.1".to_string()]
        );
        assert_eq!(
            serde_json::to_string(&body.map).unwrap(),
            r#"{"0":["variables.files.0","variables.files.1"]}"#
        );
    }

    #[tokio::test]
    #[cfg_attr(miri, ignore)]
    async fn test_distinct_content_gets_own_parts() {
        let body = pack(&request(
            vec![Upload::from_bytes("a.txt", b"one".to_vec())],
            Optional::Value(Upload::from_bytes("  ", b"%PDF-1.4".to_vec())),
        ))
        .await
        .unwrap();

        assert_eq!(body.parts.len(), 2);
        assert_eq!(body.parts[1].name, "1");
        assert_eq!(body.parts[1].file_name, None);
        assert_eq!(body.parts[1].content_type, "application/pdf");
        assert_eq!(body.parts[0].content_type, mime::TEXT_PLAIN_UTF_8);
        assert_eq!(body.map.paths("1").unwrap(), &["variables.note".to_string()]);
    }

    #[tokio::test]
    #[cfg_attr(miri, ignore)]
    async fn test_cloned_reader_upload_at_two_paths() {
        let upload = Upload::from_reader("f.txt", std::io::Cursor::new(b"hello".to_vec()));
        let body = pack(&request(vec![upload.clone()], Optional::Value(upload)))
            .await
            .unwrap();

        assert_eq!(body.parts.len(), 1);
        assert_eq!(body.parts[0].content, b"hello");
        assert_eq!(
            body.map.paths("0").unwrap(),
            &["variables.files.0".to_string(), "variables.note".to_string()]
        );
    }

    #[tokio::test]
    #[cfg_attr(miri, ignore)]
    async fn test_uploads_serialize_as_null() {
        let body = pack(&request(
            vec![Upload::from_bytes("a.txt", b"one".to_vec())],
            Optional::Absent,
        ))
        .await
        .unwrap();

        let operations: serde_json::Value = serde_json::from_str(&body.operations).unwrap();
        assert_eq!(operations["variables"]["files"], serde_json::json!([null]));
        assert!(operations["variables"].get("note").is_none());
        assert_eq!(operations["operationName"], "Attach");
    }

    #[tokio::test]
    #[cfg_attr(miri, ignore)]
    async fn test_no_files_still_has_map() {
        let body = pack(&request(Vec::new(), Optional::Absent)).await.unwrap();
        assert!(body.parts.is_empty());
        assert!(body.map.is_empty());
        assert_eq!(serde_json::to_string(&body.map).unwrap(), "{}");
        assert!(body.into_form().is_ok());
    }

    #[tokio::test]
    #[cfg_attr(miri, ignore)]
    async fn test_read_failure_is_transport_error() {
        let missing = std::env::temp_dir().join("gqlbind-missing-upload.bin");
        let err = pack(&request(
            vec![Upload::from_path("missing.bin", missing)],
            Optional::Absent,
        ))
        .await
        .unwrap_err();
        assert!(err.is_transport_error());
        assert!(matches!(err, Error::Transport { status: None, .. }));
    }
}
