//! JSON REST API for Somnia.
//!
//! Exposes an axum [`Router`] backed by any
//! [`somnia_core::store::DiagnosisStore`]. Tracing layers, TLS and other
//! transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", somnia_api::api_router(Diagnoser::new(store.clone())))
//! ```

pub mod diagnosis;
pub mod error;
pub mod history;
pub mod knowledge;

use axum::{
  Router,
  routing::{get, post, put},
};
use somnia_core::{Diagnoser, store::DiagnosisStore};

pub use error::ApiError;

/// Build a fully-materialised API router around `diagnoser`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(diagnoser: Diagnoser<S>) -> Router<()>
where
  S: DiagnosisStore + 'static,
{
  Router::new()
    // Diagnosis
    .route("/diagnosis", post(diagnosis::start::<S>))
    .route("/diagnosis/answer", post(diagnosis::answer::<S>))
    .route(
      "/diagnosis/{id}",
      get(diagnosis::step::<S>).delete(diagnosis::delete::<S>),
    )
    .route("/diagnosis/{id}/answers/{symptom}", put(diagnosis::record::<S>))
    // Knowledge base
    .route(
      "/diseases",
      get(knowledge::list_diseases::<S>).post(knowledge::create_disease::<S>),
    )
    .route(
      "/diseases/{code}",
      get(knowledge::get_disease::<S>)
        .put(knowledge::update_disease::<S>)
        .delete(knowledge::delete_disease::<S>),
    )
    .route("/diseases/{code}/symptoms", put(knowledge::set_rules::<S>))
    .route(
      "/diseases/{code}/solutions",
      get(knowledge::list_solutions::<S>).put(knowledge::set_solutions::<S>),
    )
    .route(
      "/symptoms",
      get(knowledge::list_symptoms::<S>).post(knowledge::create_symptom::<S>),
    )
    .route(
      "/symptoms/{code}",
      get(knowledge::get_symptom::<S>)
        .put(knowledge::update_symptom::<S>)
        .delete(knowledge::delete_symptom::<S>),
    )
    .route("/rules", get(knowledge::list_rules::<S>))
    // History
    .route("/history", get(history::list::<S>))
    .route("/history/{id}", get(history::get_one::<S>))
    .with_state(diagnoser)
}
