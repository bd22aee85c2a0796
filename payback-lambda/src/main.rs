use heating_payback::errors::HeatingModelError;
use heating_payback::output::SinkOutput;
use heating_payback::{run_project, ProjectFlags};
use lambda_http::{run, service_fn, tracing, Body, Error, Request, Response};
use serde_json::json;
use uuid::Uuid;

async fn function_handler(event: Request) -> Result<Response<Body>, Error> {
    let input = match event.body() {
        Body::Empty => "",
        Body::Text(text) => text.as_str(),
        Body::Binary(bytes) => std::str::from_utf8(bytes)?,
    }
    .as_bytes();

    let resp = match run_project(input, SinkOutput, &ProjectFlags::empty()) {
        Ok(results) => Response::builder()
            .status(200)
            .header("Content-Type", "application/json")
            .body(Body::from(serde_json::to_string(&results)?))
            .map_err(Box::new)?,
        Err(e) => {
            let status = match e {
                HeatingModelError::InvalidRequest(_) | HeatingModelError::FailureInCalculation(_) => 422,
                HeatingModelError::ErrorInOutput(_) => 500,
            };
            Response::builder()
                .status(status)
                .header("Content-Type", "application/json")
                .body(Body::from(serde_json::to_string(&json!({"errors": [{"id": Uuid::new_v4(), "status": status.to_string(), "detail": e.to_string()}]}))?))
                .map_err(Box::new)?
        }
    };

    Ok(resp)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing::init_default_subscriber();

    run(service_fn(function_handler)).await
}
