// SPDX-License-Identifier: Apache-2.0
//! Aggregates every sub-crate's error type into one surface the host sees.

use thiserror::Error;

/// Every error a [`crate::Spider`] run can fail with.
#[derive(Debug, Error)]
pub enum SpiderError {
    #[error(transparent)]
    Model(#[from] spider_model::ModelError),
    #[error(transparent)]
    Expr(#[from] spider_expr::ExprError),
    #[error(transparent)]
    Brv(#[from] spider_brv::BrvError),
    #[error(transparent)]
    Srt(#[from] spider_srt::SrtError),
    #[error(transparent)]
    Sched(#[from] spider_sched::SchedError),
    #[error(transparent)]
    Fifo(#[from] spider_fifo::FifoError),
    #[error(transparent)]
    Platform(#[from] spider_platform::PlatformError),
    #[error(transparent)]
    Runtime(#[from] spider_runtime::RuntimeError),
}
