use axum::http::header;
use axum::{
    extract::{multipart::Field, DefaultBodyLimit, Multipart, State},
    http::{HeaderName, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower::limit::ConcurrencyLimitLayer;
use tower::ServiceBuilder;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::timeout::TimeoutLayer;

use crate::cli::{InputArgs, ServeArgs};
use crate::core::types::LabelStyle;
use crate::export::{write_xlsx, ExportError, OutputOptions, XLSX_CONTENT_TYPE};
use crate::matching::engine::{reconcile, MatchPolicy, ReconcileConfig, ReconciliationSummary};
use crate::parsing::normalize::InputSettings;
use crate::parsing::table::TableError;
use crate::parsing::{load_deliveries, load_transactions};
use crate::utils::validation::{validate_upload, ValidationError};

/// Security configuration constants to prevent `DoS` attacks
pub const MAX_MULTIPART_FIELDS: usize = 10;
pub const MAX_FILE_FIELD_SIZE: usize = 16 * 1024 * 1024; // 16MB
pub const MAX_TEXT_FIELD_SIZE: usize = 1024 * 1024; // 1MB
pub const MAX_REQUEST_BODY_SIZE: usize = 20 * 1024 * 1024; // 20MB
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
pub const MAX_CONCURRENT_REQUESTS: usize = 100;

/// Download name of the result workbook
const RESULT_FILENAME: &str = "result.xlsx";

/// Shared application state
#[derive(Default)]
pub struct AppState {
    pub settings: InputSettings,
    /// Policy used when the form does not choose one
    pub policy: MatchPolicy,
    /// Labels used when the form does not choose them
    pub labels: LabelStyle,
}

impl AppState {
    /// Build server defaults from the command-line input options
    ///
    /// # Errors
    ///
    /// Returns an error if the column mapping file cannot be loaded.
    pub fn from_args(args: &InputArgs) -> anyhow::Result<Self> {
        Ok(Self {
            settings: args.settings()?,
            policy: args.policy,
            labels: args.labels,
        })
    }
}

/// One uploaded table
#[derive(Debug)]
struct Upload {
    bytes: Vec<u8>,
    filename: Option<String>,
}

/// Inputs extracted from the multipart form
#[derive(Debug, Default)]
struct ProcessRequest {
    transactions: Option<Upload>,
    deliveries: Option<Upload>,
    policy: Option<MatchPolicy>,
    labels: Option<LabelStyle>,
}

/// Enhanced error response
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub error_type: String,
    pub details: Option<String>,
}

/// Failure of the blocking reconcile step
#[derive(Debug, thiserror::Error)]
enum ProcessError {
    #[error("{table} file: {source}")]
    Input {
        table: &'static str,
        #[source]
        source: TableError,
    },
    #[error(transparent)]
    Export(#[from] ExportError),
}

/// Create a safe error response that prevents information disclosure
/// while logging detailed errors server-side for debugging
pub fn create_safe_error_response(
    error_type: &str,
    user_message: &str,
    internal_error: Option<&str>,
) -> ErrorResponse {
    if let Some(internal_msg) = internal_error {
        tracing::error!("Internal error ({}): {}", error_type, internal_msg);
    }

    ErrorResponse {
        error: user_message.to_string(),
        error_type: error_type.to_string(),
        details: None,
    }
}

fn error_response(
    status: StatusCode,
    error_type: &str,
    user_message: &str,
    internal_error: Option<&str>,
) -> Response {
    (
        status,
        Json(create_safe_error_response(error_type, user_message, internal_error)),
    )
        .into_response()
}

/// Run the web server
///
/// # Errors
///
/// Returns an error if the tokio runtime cannot be created or the server fails to start.
pub fn run(args: ServeArgs) -> anyhow::Result<()> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move { run_server(args).await })
}

/// Create the application router with all routes and middleware configured.
///
/// # Errors
///
/// Returns an error if the rate limiter configuration is rejected.
pub fn create_router(state: AppState) -> anyhow::Result<Router> {
    let state = Arc::new(state);

    // Configure IP-based rate limiting
    let governor_conf = GovernorConfigBuilder::default()
        // One request replenished every 100ms, i.e. 10 per second per IP
        .per_millisecond(100)
        .burst_size(50)
        .finish()
        .ok_or_else(|| anyhow::anyhow!("invalid rate limiter configuration"))?;

    let app = Router::new()
        .route("/", get(index_handler))
        .route("/process", post(process_handler))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                // Security headers for browser protection
                .layer(SetResponseHeaderLayer::if_not_present(
                    HeaderName::from_static("x-content-type-options"),
                    HeaderValue::from_static("nosniff"),
                ))
                .layer(SetResponseHeaderLayer::if_not_present(
                    HeaderName::from_static("x-frame-options"),
                    HeaderValue::from_static("DENY"),
                ))
                .layer(SetResponseHeaderLayer::if_not_present(
                    HeaderName::from_static("x-xss-protection"),
                    HeaderValue::from_static("1; mode=block"),
                ))
                .layer(SetResponseHeaderLayer::if_not_present(
                    HeaderName::from_static("strict-transport-security"),
                    HeaderValue::from_static("max-age=31536000; includeSubDomains"),
                ))
                .layer(SetResponseHeaderLayer::if_not_present(
                    HeaderName::from_static("referrer-policy"),
                    HeaderValue::from_static("strict-origin-when-cross-origin"),
                ))
                .layer(GovernorLayer {
                    config: Arc::new(governor_conf),
                })
                .layer(TimeoutLayer::with_status_code(
                    StatusCode::REQUEST_TIMEOUT,
                    REQUEST_TIMEOUT,
                ))
                .layer(ConcurrencyLimitLayer::new(MAX_CONCURRENT_REQUESTS))
                // Two file fields plus multipart overhead
                .layer(DefaultBodyLimit::max(MAX_REQUEST_BODY_SIZE)),
        );

    Ok(app)
}

async fn run_server(args: ServeArgs) -> anyhow::Result<()> {
    let state = AppState::from_args(&args.input)?;
    let app = create_router(state)?;

    let addr = format!("{}:{}", args.address, args.port);
    println!("Starting fuel-recon web server at http://{addr}");

    if args.open {
        let _ = open::that(format!("http://{addr}"));
    }

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

/// Main page handler
async fn index_handler() -> Html<&'static str> {
    Html(include_str!("templates/index.html"))
}

/// Reconcile two uploaded tables and return the annotated workbook
async fn process_handler(State(state): State<Arc<AppState>>, mut multipart: Multipart) -> Response {
    let start_time = std::time::Instant::now();

    let request = match extract_request_data(&mut multipart).await {
        Ok(request) => request,
        Err(response) => return response,
    };

    let (Some(transactions), Some(deliveries)) = (request.transactions, request.deliveries) else {
        return error_response(
            StatusCode::BAD_REQUEST,
            "missing_input",
            "transaction_file and delivery_file are required",
            None,
        );
    };

    let settings = state.settings.clone();
    let config = ReconcileConfig {
        policy: request.policy.unwrap_or(state.policy),
    };
    let options = OutputOptions {
        columns: settings.columns.clone(),
        label_style: request.labels.unwrap_or(state.labels),
        date_format: settings.date_format.clone(),
    };

    let outcome = tokio::task::spawn_blocking(move || {
        process_tables(transactions, deliveries, &settings, &config, &options)
    })
    .await;

    match outcome {
        Ok(Ok((bytes, summary))) => {
            #[allow(clippy::cast_possible_truncation)] // Processing time won't exceed u64
            let processing_time = start_time.elapsed().as_millis() as u64;
            tracing::info!(
                total = summary.total,
                matched = summary.matched(),
                ambiguous = summary.ambiguous,
                unmatched = summary.unmatched,
                processing_time_ms = processing_time,
                "reconciled upload"
            );
            xlsx_attachment(bytes)
        }
        Ok(Err(ProcessError::Input { table, source })) => input_error_response(table, &source),
        Ok(Err(ProcessError::Export(e))) => error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "export_failed",
            "Unable to produce the result workbook",
            Some(&e.to_string()),
        ),
        Err(e) => error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal_error",
            "Internal error while processing the upload",
            Some(&e.to_string()),
        ),
    }
}

/// Read, reconcile and render; runs on the blocking pool
fn process_tables(
    transactions: Upload,
    deliveries: Upload,
    settings: &InputSettings,
    config: &ReconcileConfig,
    options: &OutputOptions,
) -> Result<(Vec<u8>, ReconciliationSummary), ProcessError> {
    let transaction_rows = load_transactions(
        transactions.bytes,
        transactions.filename.as_deref(),
        settings,
    )
    .map_err(|source| ProcessError::Input {
        table: "transaction",
        source,
    })?;

    let delivery_rows = load_deliveries(deliveries.bytes, deliveries.filename.as_deref(), settings)
        .map_err(|source| ProcessError::Input {
            table: "delivery",
            source,
        })?;

    let result = reconcile(transaction_rows, &delivery_rows, config);
    let bytes = write_xlsx(&result.rows, options)?;
    Ok((bytes, result.summary))
}

/// Shape errors only name sheets and columns, so they are shown as-is.
/// Reader failures stay generic and are logged.
fn input_error_response(table: &str, source: &TableError) -> Response {
    match source {
        TableError::MissingColumn { .. }
        | TableError::SheetNotFound { .. }
        | TableError::NoSheets
        | TableError::MissingHeader(_)
        | TableError::TooManyRows => error_response(
            StatusCode::BAD_REQUEST,
            "parse_failed",
            &format!("Unable to read the {table} file: {source}"),
            None,
        ),
        TableError::Workbook(_) | TableError::Delimited(_) | TableError::UnsupportedFormat(_) => {
            error_response(
                StatusCode::BAD_REQUEST,
                "parse_failed",
                &format!("Unable to read the {table} file. Please check that it is a valid spreadsheet."),
                Some(&source.to_string()),
            )
        }
    }
}

fn xlsx_attachment(bytes: Vec<u8>) -> Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{RESULT_FILENAME}\""),
            ),
        ],
        bytes,
    )
        .into_response()
}

/// Extract uploads and options from the multipart form
async fn extract_request_data(multipart: &mut Multipart) -> Result<ProcessRequest, Response> {
    let mut request = ProcessRequest::default();
    let mut fields_received = 0usize;

    loop {
        // Check field count limit before processing
        if fields_received >= MAX_MULTIPART_FIELDS {
            return Err(error_response(
                StatusCode::BAD_REQUEST,
                "field_limit_exceeded",
                "Too many form fields",
                None,
            ));
        }

        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                return Err(error_response(
                    e.status(),
                    "invalid_multipart",
                    "Failed to parse upload. Please check the form data.",
                    Some(&e.to_string()),
                ));
            }
        };
        fields_received += 1;

        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "transaction_file" => request.transactions = Some(read_upload(field).await?),
            "delivery_file" => request.deliveries = Some(read_upload(field).await?),
            "match_policy" => {
                let text = read_text(field).await?;
                request.policy = parse_option(&text, "match_policy")?;
            }
            "label_style" => {
                let text = read_text(field).await?;
                request.labels = parse_option(&text, "label_style")?;
            }
            _ => {} // Ignore unknown fields
        }
    }

    Ok(request)
}

/// Read and validate one file field
async fn read_upload(field: Field<'_>) -> Result<Upload, Response> {
    let filename = field.file_name().map(std::string::ToString::to_string);

    let bytes = field.bytes().await.map_err(|e| {
        error_response(
            e.status(),
            "invalid_multipart",
            "Failed to read uploaded file",
            Some(&e.to_string()),
        )
    })?;

    if bytes.len() > MAX_FILE_FIELD_SIZE {
        return Err(error_response(
            StatusCode::PAYLOAD_TOO_LARGE,
            "file_too_large",
            "File size exceeds limit",
            None,
        ));
    }

    let upload = validate_upload(filename.as_deref(), &bytes).map_err(validation_error_response)?;
    tracing::debug!(
        filename = ?upload.filename,
        format = upload.format.display_name(),
        bytes = bytes.len(),
        "accepted upload"
    );

    Ok(Upload {
        bytes: bytes.to_vec(),
        filename: upload.filename,
    })
}

async fn read_text(field: Field<'_>) -> Result<String, Response> {
    let text = field.text().await.map_err(|e| {
        error_response(
            e.status(),
            "invalid_multipart",
            "Failed to read form field",
            Some(&e.to_string()),
        )
    })?;

    if text.len() > MAX_TEXT_FIELD_SIZE {
        return Err(error_response(
            StatusCode::PAYLOAD_TOO_LARGE,
            "text_too_large",
            "Text field size exceeds limit",
            None,
        ));
    }

    Ok(text)
}

/// Blank means "use the server default"
fn parse_option<T: FromStr<Err = String>>(text: &str, field: &str) -> Result<Option<T>, Response> {
    if text.trim().is_empty() {
        return Ok(None);
    }
    T::from_str(text).map(Some).map_err(|e| {
        error_response(
            StatusCode::BAD_REQUEST,
            "invalid_option",
            &format!("Invalid value for {field}"),
            Some(&e),
        )
    })
}

fn validation_error_response(error: ValidationError) -> Response {
    let (error_type, message) = match error {
        ValidationError::FilenameTooLong => {
            ("filename_too_long", "Filename exceeds maximum length limit")
        }
        ValidationError::InvalidFilename | ValidationError::EmptyFilename => (
            "invalid_filename",
            "Filename contains invalid or dangerous characters",
        ),
        ValidationError::FormatValidationFailed => (
            "format_mismatch",
            "File is not a supported spreadsheet or does not match its extension",
        ),
        ValidationError::InvalidFileContent => {
            ("invalid_content", "File content appears malformed or corrupted")
        }
    };

    error_response(StatusCode::BAD_REQUEST, error_type, message, None)
}
