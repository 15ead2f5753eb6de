//! Client-side orchestration for the EduSlide presentation generator.
//!
//! A [`form::FormState`] is validated into a request, the
//! [`orchestrator::GenerationController`] submits it to a
//! [`service::GenerationService`] while a [`progress::ProgressSimulator`]
//! keeps the user informed, and successful results land in the
//! [`history::HistoryStore`].

pub mod catalog;
pub mod cli;
pub mod error;
pub mod form;
pub mod history;
pub mod logging;
pub mod model;
pub mod notify;
pub mod orchestrator;
pub mod progress;
pub mod service;
pub mod storage;
pub mod text_summary;
