pub mod report_handler;

pub use report_handler::{
    __path_add_message, __path_delete_report, __path_get_report, __path_list_all_reports,
    __path_list_own_reports, __path_submit_report, add_message, delete_report, get_report,
    list_all_reports, list_own_reports, submit_report, ReportState,
};
