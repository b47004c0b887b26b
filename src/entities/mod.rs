//! Laboratory entity kinds
//!
//! Each kind carries its model, its static query spec (filters, sort keys and
//! load paths), its storage wiring and its wire mapping.

#[macro_use]
pub mod macros;

pub mod batch;
pub mod batch_test_result;
pub mod customer;
pub mod machine;
pub mod product;
pub mod qc_kpi;
pub mod report;
pub mod test_result;

pub use batch::{Batch, BatchDto, BatchInput};
pub use batch_test_result::{BatchTestResult, BatchTestResultDto, BatchTestResultInput};
pub use customer::{Customer, CustomerDto, CustomerInput};
pub use machine::{Machine, MachineDto, MachineInput};
pub use product::{Product, ProductDto, ProductInput};
pub use qc_kpi::{QcKpi, QcKpiDto, QcKpiInput};
pub use report::{Report, ReportDto, ReportInput};
pub use test_result::{TestResult, TestResultDto, TestResultInput};
