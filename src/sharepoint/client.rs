//! SharePoint REST client.
//!
//! One client maps to one authenticated session against a site collection.
//! The session cookies obtained during [`SharePointClient::connect`] live in
//! the HTTP client's cookie store; every REST call rides on them.

use reqwest::Url;
use reqwest::blocking::{Client, Response};
use serde::Deserialize;
use tracing::info;

use crate::error::{EtlError, Result};
use crate::io::{read_csv_bytes, read_excel_bytes};
use crate::model::Frame;
use crate::sharepoint::auth;

const ODATA_ACCEPT: &str = "application/json;odata=verbose";

/// SharePoint site URL and credentials from the `[SharePointConfig]` section.
#[derive(Debug, Clone)]
pub struct SharePointSettings {
    pub site_url: String,
    pub username: String,
    pub password: String,
}

/// Remote file formats the fetch path understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Csv,
    Xlsx,
}

impl std::str::FromStr for FileFormat {
    type Err = EtlError;

    fn from_str(value: &str) -> Result<Self> {
        match value.to_ascii_lowercase().as_str() {
            "csv" => Ok(FileFormat::Csv),
            "xlsx" => Ok(FileFormat::Xlsx),
            other => Err(EtlError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// A file listed from a SharePoint folder.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteFile {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "ServerRelativeUrl")]
    pub server_relative_url: String,
    #[serde(rename = "TimeLastModified")]
    pub time_last_modified: String,
}

/// Authenticated client for one SharePoint site.
pub struct SharePointClient {
    http: Client,
    site_url: String,
}

impl SharePointClient {
    /// Authenticates against the site with user credentials.
    pub fn connect(settings: &SharePointSettings) -> Result<Self> {
        let site_url = settings.site_url.trim_end_matches('/').to_string();
        let root = site_root(&site_url)?;
        let http = Client::builder().cookie_store(true).build()?;

        let envelope =
            auth::security_token_request(&settings.username, &settings.password, &site_url);
        let response = http.post(auth::STS_URL).body(envelope).send()?;
        let body = response.text()?;
        let token = auth::extract_security_token(&body)?;

        let signin = http.post(auth::signin_url(&root)).body(token).send()?;
        if !signin.status().is_success() {
            return Err(EtlError::SharePointAuth(format!(
                "sign-in endpoint answered {}",
                signin.status()
            )));
        }

        info!(site = %site_url, user = %settings.username, "authenticated to SharePoint");
        Ok(Self { http, site_url })
    }

    /// Downloads a file by its server-relative URL.
    pub fn fetch_file(&self, server_relative_url: &str) -> Result<Vec<u8>> {
        let url = self.api_url(&format!(
            "/web/GetFileByServerRelativeUrl('{}')/$value",
            odata_path(server_relative_url)
        ));
        let response = self.http.get(url).send()?;
        let response = check_status(response)?;
        let bytes = response.bytes()?.to_vec();
        info!(
            file = server_relative_url,
            bytes = bytes.len(),
            "fetched file from SharePoint"
        );
        Ok(bytes)
    }

    /// Downloads a file and parses it into a frame.
    pub fn fetch_frame(
        &self,
        server_relative_url: &str,
        format: FileFormat,
        sheet: Option<&str>,
    ) -> Result<Frame> {
        let bytes = self.fetch_file(server_relative_url)?;
        match format {
            FileFormat::Csv => read_csv_bytes(&bytes),
            FileFormat::Xlsx => read_excel_bytes(&bytes, sheet),
        }
    }

    /// Uploads a file into a folder, overwriting any existing copy.
    pub fn upload_file(&self, folder_url: &str, file_name: &str, bytes: Vec<u8>) -> Result<()> {
        let digest = self.form_digest()?;
        let url = self.api_url(&format!(
            "/web/GetFolderByServerRelativeUrl('{}')/Files/add(url='{}',overwrite=true)",
            odata_path(folder_url),
            odata_path(file_name)
        ));
        let response = self
            .http
            .post(url)
            .header("Accept", ODATA_ACCEPT)
            .header("X-RequestDigest", digest)
            .body(bytes)
            .send()?;
        check_status(response)?;
        info!(folder = folder_url, file = file_name, "uploaded file to SharePoint");
        Ok(())
    }

    /// Lists the files in a folder.
    pub fn list_files(&self, folder_url: &str) -> Result<Vec<RemoteFile>> {
        let url = self.api_url(&format!(
            "/web/GetFolderByServerRelativeUrl('{}')/Files",
            odata_path(folder_url)
        ));
        let response = self.http.get(url).header("Accept", ODATA_ACCEPT).send()?;
        let response = check_status(response)?;
        let listing: FileListResponse = response.json()?;
        Ok(listing.d.results)
    }

    fn form_digest(&self) -> Result<String> {
        let response = self
            .http
            .post(self.api_url("/contextinfo"))
            .header("Accept", ODATA_ACCEPT)
            .send()?;
        let response = check_status(response)?;
        let info: ContextInfoResponse = response.json()?;
        Ok(info.d.web_information.form_digest_value)
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/_api{}", self.site_url, path)
    }
}

fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        let message = response.text().unwrap_or_default();
        Err(EtlError::SharePointApi {
            status: status.as_u16(),
            message,
        })
    }
}

// Site collections live under a path; the sign-in endpoint is at the root.
fn site_root(site_url: &str) -> Result<String> {
    let parsed = Url::parse(site_url)
        .map_err(|err| EtlError::SharePointAuth(format!("invalid site url: {err}")))?;
    let host = parsed
        .host_str()
        .ok_or_else(|| EtlError::SharePointAuth("site url has no host".to_string()))?;
    Ok(format!("{}://{}", parsed.scheme(), host))
}

// Quotes are doubled for the OData string literal, then each path segment is
// percent-encoded; the server decodes the segments before parsing the literal.
fn odata_path(value: &str) -> String {
    value
        .replace('\'', "''")
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

#[derive(Deserialize)]
struct ContextInfoResponse {
    d: ContextInfoBody,
}

#[derive(Deserialize)]
struct ContextInfoBody {
    #[serde(rename = "GetContextWebInformation")]
    web_information: WebInformation,
}

#[derive(Deserialize)]
struct WebInformation {
    #[serde(rename = "FormDigestValue")]
    form_digest_value: String,
}

#[derive(Deserialize)]
struct FileListResponse {
    d: FileListBody,
}

#[derive(Deserialize)]
struct FileListBody {
    results: Vec<RemoteFile>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn site_root_strips_the_site_path() {
        let root = site_root("https://example.sharepoint.com/sites/ProviderAnalytics")
            .expect("root derived");
        assert_eq!(root, "https://example.sharepoint.com");
    }

    #[test]
    fn odata_paths_escape_quotes_and_encode_segments() {
        assert_eq!(
            odata_path("/sites/x/Shared Documents/o'hara.csv"),
            "/sites/x/Shared%20Documents/o%27%27hara.csv"
        );
    }

    #[test]
    fn form_digest_response_parses() {
        let body = r#"{"d":{"GetContextWebInformation":{"FormDigestValue":"0xABC,06 Aug 2026"}}}"#;
        let parsed: ContextInfoResponse = serde_json::from_str(body).expect("digest parsed");
        assert_eq!(
            parsed.d.web_information.form_digest_value,
            "0xABC,06 Aug 2026"
        );
    }

    #[test]
    fn file_listing_response_parses() {
        let body = r#"{"d":{"results":[
            {"Name":"a.csv","ServerRelativeUrl":"/sites/x/a.csv","TimeLastModified":"2026-08-01T00:00:00Z"}
        ]}}"#;
        let parsed: FileListResponse = serde_json::from_str(body).expect("listing parsed");
        assert_eq!(parsed.d.results.len(), 1);
        assert_eq!(parsed.d.results[0].name, "a.csv");
    }

    #[test]
    fn unsupported_format_is_rejected() {
        let result = "pdf".parse::<FileFormat>();
        assert!(matches!(result, Err(EtlError::UnsupportedFormat(_))));
        assert_eq!("CSV".parse::<FileFormat>().expect("parsed"), FileFormat::Csv);
    }
}
