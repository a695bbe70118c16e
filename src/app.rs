//! app.rs
use crate::handlers::{callback_handler, sms_handler, status_handler, wallet_handler};
use actix_web::web;

pub fn init_app(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .service(
                web::scope("/sms")
                    .route("/send", web::post().to(sms_handler::send_sms_endpoint))
                    .route(
                        "/callback",
                        web::post().to(callback_handler::sms_callback_endpoint),
                    )
                    .route(
                        "/check-status",
                        web::post().to(status_handler::check_sms_status_endpoint),
                    )
                    .route(
                        "/schedule-check",
                        web::post().to(status_handler::schedule_status_check_endpoint),
                    )
                    .route("", web::get().to(sms_handler::list_sms_endpoint))
                    .route("/{id}", web::get().to(sms_handler::get_sms_endpoint)),
            )
            .service(
                web::scope("/wallet")
                    .route("", web::get().to(wallet_handler::get_wallet_endpoint))
                    .route(
                        "/topup",
                        web::post().to(wallet_handler::topup_wallet_endpoint),
                    ),
            ),
    );
}
