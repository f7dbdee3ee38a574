pub mod report_dto;

pub use report_dto::{
    CreateMessageDto, DeleteReportResponseDto, IncomingFile, ReportFileDto, ReportMessageDto,
    ReportResponseDto, SubmitReportDto, SubmitReportResponseDto, SubmitReportUploadDto,
};
