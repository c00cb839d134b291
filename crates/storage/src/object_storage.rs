use gloo_net::http::Request;
use ironlog_domain as domain;
use log::debug;
use serde::Deserialize;

use crate::{
    auth::bearer,
    firebase::Firebase,
    http::{HttpError, SendRequest, fetch, fetch_no_content},
};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ObjectMetadata {
    name: String,
    #[serde(default)]
    download_tokens: Option<String>,
}

/// Public URL of a stored object. Only the first download token is used.
#[must_use]
pub fn download_url(storage_url: &str, bucket: &str, name: &str, token: Option<&str>) -> String {
    let url = format!(
        "{storage_url}/b/{bucket}/o/{}?alt=media",
        urlencoding::encode(name)
    );
    match token.and_then(|tokens| tokens.split(',').next()) {
        Some(token) if !token.is_empty() => format!("{url}&token={token}"),
        _ => url,
    }
}

/// Object name contained in a download URL, e.g. `machines/m1/1_photo.jpg`.
#[must_use]
pub fn object_name(url: &str) -> Option<String> {
    let (_, encoded) = url.split_once("/o/")?;
    let encoded = encoded.split('?').next().unwrap_or_default();
    if encoded.is_empty() {
        return None;
    }
    urlencoding::decode(encoded).ok().map(|name| name.into_owned())
}

impl<S: SendRequest> Firebase<S> {
    fn object_url(&self, name: &str) -> String {
        format!(
            "{}/b/{}/o/{}",
            self.config.storage_url,
            self.config.storage_bucket,
            urlencoding::encode(name)
        )
    }
}

impl<S: SendRequest> domain::ObjectStorageRepository for Firebase<S> {
    async fn upload_object(
        &self,
        path: &str,
        upload: &domain::Upload,
    ) -> Result<String, domain::CreateError> {
        let token = self.id_token().await?;
        let metadata: ObjectMetadata = fetch(
            &self.sender,
            Request::post(&format!(
                "{}/b/{}/o?uploadType=media&name={}",
                self.config.storage_url,
                self.config.storage_bucket,
                urlencoding::encode(path)
            ))
            .header("Authorization", &bearer(&token))
            .header("Content-Type", &upload.content_type)
            .body(js_sys::Uint8Array::from(upload.bytes.as_slice())),
        )
        .await?;
        debug!("uploaded {}", metadata.name);
        Ok(download_url(
            self.config.storage_url,
            self.config.storage_bucket,
            &metadata.name,
            metadata.download_tokens.as_deref(),
        ))
    }

    async fn delete_object(&self, url: &str) -> Result<(), domain::DeleteError> {
        let Some(name) = object_name(url) else {
            return Err(domain::DeleteError::Other(
                format!("not a storage URL: {url}").into(),
            ));
        };
        let token = self.id_token().await?;
        match fetch_no_content(
            &self.sender,
            Request::delete(&self.object_url(&name))
                .header("Authorization", &bearer(&token))
                .build(),
        )
        .await
        {
            Ok(()) | Err(HttpError::Status { status: 404, .. }) => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}
