use crate::domain::report::Report;
use crate::errors::ServerError;
use crate::responses::xlsx_response;
use crate::responses::ResultResp;
use rust_xlsxwriter::Workbook;

pub fn export_reports_xlsx(reports: &[Report]) -> ResultResp {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    // Headers
    let headers = [
        "Id",
        "Title",
        "Location",
        "Priority",
        "Status",
        "Category",
        "Reported",
        "Citizen Photos",
        "Progress Photos",
    ];

    for (col, header) in headers.iter().enumerate() {
        worksheet
            .write_string(0, col as u16, *header)
            .map_err(|e| {
                ServerError::XlsxError(format!("Failed to write header '{}': {}", header, e))
            })?;
    }

    // Rows
    for (i, report) in reports.iter().enumerate() {
        let r = (i + 1) as u32;

        worksheet
            .write_string(r, 0, &report.id)
            .map_err(|e| ServerError::XlsxError(format!("Failed to write id: {}", e)))?;

        worksheet
            .write_string(r, 1, &report.title)
            .map_err(|e| ServerError::XlsxError(format!("Failed to write title: {}", e)))?;

        worksheet
            .write_string(r, 2, &report.location)
            .map_err(|e| ServerError::XlsxError(format!("Failed to write location: {}", e)))?;

        worksheet
            .write_string(r, 3, report.priority.as_str())
            .map_err(|e| ServerError::XlsxError(format!("Failed to write priority: {}", e)))?;

        worksheet
            .write_string(r, 4, report.status.label())
            .map_err(|e| ServerError::XlsxError(format!("Failed to write status: {}", e)))?;

        worksheet
            .write_string(r, 5, &report.category)
            .map_err(|e| ServerError::XlsxError(format!("Failed to write category: {}", e)))?;

        let reported = report
            .created_at
            .map(|ts| ts.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default();
        worksheet
            .write_string(r, 6, &reported)
            .map_err(|e| ServerError::XlsxError(format!("Failed to write reported date: {}", e)))?;

        worksheet
            .write_number(r, 7, report.images.len() as f64)
            .map_err(|e| ServerError::XlsxError(format!("Failed to write photo count: {}", e)))?;

        worksheet
            .write_number(r, 8, report.progress_images.len() as f64)
            .map_err(|e| {
                ServerError::XlsxError(format!("Failed to write progress count: {}", e))
            })?;
    }

    let buffer = workbook
        .save_to_buffer()
        .map_err(|e| ServerError::XlsxError(format!("Failed to build workbook: {}", e)))?;

    xlsx_response(buffer, "civic_reports.xlsx")
}
