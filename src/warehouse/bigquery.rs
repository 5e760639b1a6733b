use super::{Field, TableRef, Warehouse, WriteDisposition};
use crate::{error::LoaderError, journal::JournalRecord, parse};
use reqwest::{header::CONTENT_TYPE, Response};
use serde::{Deserialize, Serialize};
use std::{fmt, time::Duration};

/// Default root of the BigQuery REST API.
pub const DEFAULT_API_URL: &str = "https://bigquery.googleapis.com";

const BOUNDARY: &str = "journal_loader_7f3a9c1e5b2d4086";

/// BigQuery client speaking the v2 REST API with a bearer token.
pub struct BigQuery {
    client: reqwest::Client,
    access_token: String,
    api_url: String,
    poll_interval: Duration,
}

impl fmt::Debug for BigQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BigQuery")
            .field("access_token", &"***")
            .field("api_url", &self.api_url)
            .field("poll_interval", &self.poll_interval)
            .finish()
    }
}

#[derive(Serialize)]
struct Schema<'a> {
    fields: &'a [Field],
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TableResource<'a> {
    table_reference: &'a TableRef,
    schema: Schema<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LoadConfiguration<'a> {
    destination_table: &'a TableRef,
    schema: Schema<'a>,
    source_format: &'static str,
    write_disposition: WriteDisposition,
}

#[derive(Serialize)]
struct JobConfiguration<'a> {
    load: LoadConfiguration<'a>,
}

#[derive(Serialize)]
struct JobResource<'a> {
    configuration: JobConfiguration<'a>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JobReference {
    job_id: String,
    location: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorProto {
    #[serde(default)]
    reason: String,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JobStatus {
    #[serde(default)]
    state: String,
    error_result: Option<ErrorProto>,
    #[serde(default)]
    errors: Vec<ErrorProto>,
}

impl JobStatus {
    fn is_done(&self) -> bool {
        self.state == "DONE"
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Job {
    job_reference: JobReference,
    #[serde(default)]
    status: JobStatus,
}

impl Job {
    /// Consumes a finished `Job`, turning a recorded failure into an error.
    fn into_result(self) -> Result<(), LoaderError> {
        let job_id = self.job_reference.job_id;

        for err in &self.status.errors {
            tracing::debug!(%job_id, reason = %err.reason, "{}", err.message);
        }

        match self.status.error_result {
            Some(err) => Err(LoaderError::job(job_id, err.message)),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TableMetadata {
    num_rows: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ApiError,
}

/// Build a `multipart/related` upload body from the job metadata and the data.
fn multipart_body(metadata: &[u8], data: &[u8]) -> Vec<u8> {
    let mut body = Vec::with_capacity(metadata.len() + data.len() + 256);
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(b"Content-Type: application/json; charset=UTF-8\r\n\r\n");
    body.extend_from_slice(metadata);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

/// Pass a successful response through, or convert the API error into a `LoaderError`.
async fn check(response: Response) -> Result<Response, LoaderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = match serde_json::from_str::<ErrorResponse>(&body) {
        Ok(parsed) => parsed.error.message,
        Err(_) => body,
    };

    Err(LoaderError::remote(status.as_u16(), message))
}

impl BigQuery {
    /// Construct a new `BigQuery` client.
    /// Requests carry no timeout, a load job is waited on until it finishes.
    pub fn new(
        access_token: String,
        api_url: &str,
        poll_interval: Duration,
    ) -> Result<Self, LoaderError> {
        let client = reqwest::Client::builder().build()?;

        Ok(BigQuery {
            client,
            access_token,
            api_url: api_url.trim_end_matches('/').to_owned(),
            poll_interval,
        })
    }

    fn tables_url(&self, project_id: &str, dataset_id: &str) -> String {
        format!(
            "{}/bigquery/v2/projects/{project_id}/datasets/{dataset_id}/tables",
            self.api_url
        )
    }

    fn table_url(&self, table: &TableRef) -> String {
        format!(
            "{}/{}",
            self.tables_url(&table.project_id, &table.dataset_id),
            table.table_id
        )
    }

    fn upload_url(&self, project_id: &str) -> String {
        format!(
            "{}/upload/bigquery/v2/projects/{project_id}/jobs?uploadType=multipart",
            self.api_url
        )
    }

    fn job_url(&self, project_id: &str, job_id: &str) -> String {
        format!(
            "{}/bigquery/v2/projects/{project_id}/jobs/{job_id}",
            self.api_url
        )
    }

    /// Fetch the job until it reports `DONE`.
    async fn wait_for(&self, project_id: &str, mut job: Job) -> Result<Job, LoaderError> {
        while !job.status.is_done() {
            tracing::debug!(
                job_id = %job.job_reference.job_id,
                state = %job.status.state,
                "waiting for load job"
            );
            tokio::time::sleep(self.poll_interval).await;

            let mut request = self
                .client
                .get(self.job_url(project_id, &job.job_reference.job_id))
                .bearer_auth(&self.access_token);
            if let Some(location) = &job.job_reference.location {
                request = request.query(&[("location", location)]);
            }

            job = check(request.send().await?).await?.json().await?;
        }

        Ok(job)
    }
}

impl Warehouse for BigQuery {
    async fn delete_table(&mut self, table: &TableRef) -> Result<(), LoaderError> {
        let response = self
            .client
            .delete(self.table_url(table))
            .bearer_auth(&self.access_token)
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    async fn create_table(&mut self, table: &TableRef, schema: &[Field]) -> Result<(), LoaderError> {
        let resource = TableResource {
            table_reference: table,
            schema: Schema { fields: schema },
        };

        let response = self
            .client
            .post(self.tables_url(&table.project_id, &table.dataset_id))
            .bearer_auth(&self.access_token)
            .json(&resource)
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    async fn load_table(
        &mut self,
        table: &TableRef,
        schema: &[Field],
        records: &[JournalRecord],
        disposition: WriteDisposition,
    ) -> Result<(), LoaderError> {
        let resource = JobResource {
            configuration: JobConfiguration {
                load: LoadConfiguration {
                    destination_table: table,
                    schema: Schema { fields: schema },
                    source_format: "NEWLINE_DELIMITED_JSON",
                    write_disposition: disposition,
                },
            },
        };
        let metadata = serde_json::to_vec(&resource)?;
        // One multipart request carries the whole payload. A yearly SCImago
        // export is about 2 MB of NDJSON; a resumable upload would be needed
        // well above 5 MB.
        let data = parse::to_ndjson(records)?;

        let response = self
            .client
            .post(self.upload_url(&table.project_id))
            .bearer_auth(&self.access_token)
            .header(
                CONTENT_TYPE,
                format!("multipart/related; boundary={BOUNDARY}"),
            )
            .body(multipart_body(&metadata, &data))
            .send()
            .await?;

        let job: Job = check(response).await?.json().await?;
        tracing::debug!(job_id = %job.job_reference.job_id, "started load job");

        self.wait_for(&table.project_id, job).await?.into_result()
    }

    async fn num_rows(&mut self, table: &TableRef) -> Result<u64, LoaderError> {
        let response = self
            .client
            .get(self.table_url(table))
            .bearer_auth(&self.access_token)
            .send()
            .await?;

        let metadata: TableMetadata = check(response).await?.json().await?;
        let num_rows = metadata
            .num_rows
            .ok_or(LoaderError::MalformedResponse("numRows"))?;

        num_rows
            .parse()
            .map_err(|_| LoaderError::MalformedResponse("numRows"))
    }
}
