//! `PostgREST` client for the hosted `libros` collection
//!
//! Speaks the row API exposed by Supabase at `<base>/rest/v1/<table>`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{
    header::{self, HeaderMap, HeaderValue, AUTHORIZATION},
    Client, Method, Response,
};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware, RequestBuilder};
use reqwest_tracing::TracingMiddleware;

use super::{
    Book, BookColumn, BookFilter, BookOrder, BookRecord, BookStorageError, BookStorageResult,
    BookStore,
};

/// Per-call timeout towards the store
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Maximum idle connections kept per host
const MAX_IDLE_CONNECTIONS_PER_HOST: usize = 10;

/// Query parameters of one request
type Query = Vec<(&'static str, String)>;

/// Book store backed by a `PostgREST` endpoint
pub struct PostgrestBookStore {
    http_client: ClientWithMiddleware,
    table_url: String,
}

impl PostgrestBookStore {
    /// Creates a new store client
    ///
    /// # Arguments
    ///
    /// * `base_url` - Project URL, e.g. `https://xyz.supabase.co`
    /// * `api_key` - Key sent as `apikey` and bearer token
    /// * `table_name` - Collection holding the books
    ///
    /// # Errors
    ///
    /// Returns `BookStorageError::ConfigError` if the key is not a valid header value
    /// Returns `BookStorageError::TransportError` if the HTTP client cannot be built
    pub fn new(base_url: &str, api_key: &str, table_name: &str) -> BookStorageResult<Self> {
        let key = HeaderValue::from_str(api_key)
            .map_err(|e| BookStorageError::ConfigError(format!("Invalid store key: {e}")))?;
        let bearer = HeaderValue::from_str(&format!("Bearer {api_key}"))
            .map_err(|e| BookStorageError::ConfigError(format!("Invalid store key: {e}")))?;

        let mut headers = HeaderMap::new();
        headers.insert("apikey", key);
        headers.insert(AUTHORIZATION, bearer);

        let reqwest_client = Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .pool_max_idle_per_host(MAX_IDLE_CONNECTIONS_PER_HOST)
            .build()?;

        let http_client = ClientBuilder::new(reqwest_client)
            .with(TracingMiddleware::default())
            .build();

        Ok(Self {
            http_client,
            table_url: format!("{}/rest/v1/{table_name}", base_url.trim_end_matches('/')),
        })
    }

    fn request(&self, method: Method, query: &Query) -> RequestBuilder {
        self.http_client
            .request(method, &self.table_url)
            .query(query)
    }

    /// Request carrying `record` as its JSON body, asking the store to echo the rows
    fn write_request(
        &self,
        method: Method,
        query: &Query,
        record: &BookRecord,
    ) -> BookStorageResult<RequestBuilder> {
        let body = serde_json::to_string(record)?;
        Ok(self
            .request(method, query)
            .header(header::CONTENT_TYPE, "application/json")
            .header("Prefer", "return=representation")
            .body(body))
    }

    async fn fetch_rows(&self, query: &Query) -> BookStorageResult<Vec<Book>> {
        let response = self.request(Method::GET, query).send().await?;
        let body = check_status(response).await?.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

/// Turns a non-success response into `BookStorageError::UpstreamError`
async fn check_status(response: Response) -> BookStorageResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response.text().await.unwrap_or_default();
    Err(BookStorageError::UpstreamError {
        status: status.as_u16(),
        message,
    })
}

fn order_param(order: BookOrder) -> String {
    let direction = if order.is_descending() { "desc" } else { "asc" };
    format!("{}.{direction}", order.column())
}

fn eq_param(value: &str) -> String {
    format!("eq.{value}")
}

/// Escapes the `LIKE` metacharacters so the text matches literally
fn escape_like(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Double-quotes a value for use inside a `PostgREST` logic tree like `or=(...)`
fn quote(value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{escaped}\"")
}

fn list_query(order: BookOrder) -> Query {
    vec![("select", "*".to_string()), ("order", order_param(order))]
}

fn by_id_query(id: &str) -> Query {
    vec![
        ("select", "*".to_string()),
        (BookColumn::Id.into(), eq_param(id)),
    ]
}

fn search_query(filter: &BookFilter) -> Query {
    let mut query = vec![("select", "*".to_string())];

    if let Some(text) = &filter.text {
        let pattern = quote(&format!("*{}*", escape_like(text)));
        let alternatives = BookFilter::text_columns()
            .iter()
            .map(|column| format!("{column}.ilike.{pattern}"))
            .collect::<Vec<_>>()
            .join(",");
        query.push(("or", format!("({alternatives})")));
    }

    if let Some(category) = &filter.category {
        query.push((BookColumn::Category.into(), eq_param(category)));
    }

    query.push(("order", order_param(BookOrder::TitleAsc)));
    query
}

#[async_trait]
impl BookStore for PostgrestBookStore {
    async fn list(&self, order: BookOrder) -> BookStorageResult<Vec<Book>> {
        self.fetch_rows(&list_query(order)).await
    }

    async fn get_one(&self, id: &str) -> BookStorageResult<Option<Book>> {
        let mut rows = self.fetch_rows(&by_id_query(id)).await?;
        match rows.len() {
            0 => Ok(None),
            1 => Ok(rows.pop()),
            count => Err(BookStorageError::UnexpectedRowCount {
                id: id.to_string(),
                count,
            }),
        }
    }

    async fn search(&self, filter: &BookFilter) -> BookStorageResult<Vec<Book>> {
        self.fetch_rows(&search_query(filter)).await
    }

    async fn categories(&self) -> BookStorageResult<Vec<String>> {
        #[derive(serde::Deserialize)]
        struct CategoryRow {
            #[serde(rename = "categoria", default)]
            category: Option<String>,
        }

        let query = vec![("select", BookColumn::Category.to_string())];
        let response = self.request(Method::GET, &query).send().await?;
        let body = check_status(response).await?.bytes().await?;
        let rows: Vec<CategoryRow> = serde_json::from_slice(&body)?;

        Ok(rows
            .into_iter()
            .map(|row| row.category.unwrap_or_default())
            .collect())
    }

    async fn insert(&self, record: BookRecord) -> BookStorageResult<Book> {
        let response = self
            .write_request(Method::POST, &Vec::new(), &record)?
            .send()
            .await?;
        let body = check_status(response).await?.bytes().await?;
        let mut rows: Vec<Book> = serde_json::from_slice(&body)?;

        rows.pop().ok_or(BookStorageError::UpstreamError {
            status: 201,
            message: "insert returned no row".to_string(),
        })
    }

    async fn update(&self, id: &str, record: BookRecord) -> BookStorageResult<()> {
        let query: Query = vec![(BookColumn::Id.into(), eq_param(id))];
        let response = self
            .write_request(Method::PATCH, &query, &record)?
            .send()
            .await?;
        let body = check_status(response).await?.bytes().await?;
        let rows: Vec<Book> = serde_json::from_slice(&body)?;

        if rows.is_empty() {
            return Err(BookStorageError::NotFound(id.to_string()));
        }
        Ok(())
    }

    async fn delete(&self, id: &str) -> BookStorageResult<()> {
        let query: Query = vec![(BookColumn::Id.into(), eq_param(id))];
        let response = self.request(Method::DELETE, &query).send().await?;
        check_status(response).await?;
        Ok(())
    }
}
