//! Generic parallel execution framework
//!
//! The parallel module focuses exclusively on **system resource management** and **execution strategy**:
//!
//! ## What This Module Does:
//! - **Resource Discovery**: Detects available CPU cores using `num_cpus::get()`
//! - **Resource Calculation**: Applies user configuration (thread percentage, max threads) to available resources
//! - **Execution Strategy**: Runs small workloads on the calling thread, larger ones on crossbeam workers
//! - **Per-worker State**: Each worker builds its own state on its own thread
//!
//! ## What This Module Does NOT Do:
//! - **Domain Logic**: Does not know what a candidate or a filter chain is
//!
//! ```text
//! ┌─────────────────┐    ┌──────────────────┐    ┌─────────────────┐
//! │   Client        │    │   Parallel       │    │   System        │
//! │   (Runner)      │───▶│   Module         │───▶│   Resources     │
//! │                 │    │                  │    │                 │
//! │ • Candidates    │    │ • CPU cores      │    │ • Hardware      │
//! │ • Filter chain  │    │ • Thread mgmt    │    │ • OS limits     │
//! │   per worker    │    │ • Result order   │    │                 │
//! └─────────────────┘    └──────────────────┘    └─────────────────┘
//! ```
//!
//! # Example Usage
//!
//! ```rust
//! use xmlsift::parallel::{ParallelConfig, ParallelProcessor};
//!
//! let processor = ParallelProcessor::new(ParallelConfig::default());
//! let doubled = processor
//!     .process_with_init(vec![1, 2, 3], || Ok(2), |factor, x| x * *factor, "Doubling")
//!     .unwrap();
//! assert_eq!(doubled, vec![2, 4, 6]);
//! ```

pub mod processor;

// Re-export main types for easier access
pub use processor::{ParallelConfig, ParallelProcessor};
