use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use dotenv::dotenv;
use sqlx::{Pool, Sqlite};

use crate::config::sms_config::SmsConfig;
use crate::logger::init_logger;
use crate::services::delivery_service::DeliveryService;
use crate::services::gateway_service::GatewayService;
use crate::services::sms_record_service::SmsRecordService;
use crate::services::sms_service::SmsService;
use crate::services::wallet_service::WalletService;

mod app;
mod config;
mod handlers;
mod logger;
mod models;
mod services;
#[cfg(test)]
mod tests;

async fn setup_database(config: &SmsConfig) -> Pool<Sqlite> {
    log::info!("Conectando a la base en {}", config.database_url);

    let db_pool = Pool::<Sqlite>::connect(&config.database_url)
        .await
        .expect("No se pudo conectar a la base de datos.");

    db_pool
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok(); // Cargar .env al inicio
    init_logger();

    // Config del entorno; si falta algo requerido, no arrancamos
    let config = SmsConfig::from_env().expect("Configuración incompleta");

    // Conectarnos a la DB
    let db_pool = setup_database(&config).await;

    // SmsRecordService + migraciones
    let record_service = SmsRecordService::new(db_pool.clone());
    if let Err(e) = record_service.run_migrations().await {
        panic!("Fallo en migraciones: {:?}", e);
    }

    let wallet_service = WalletService::new(db_pool.clone());

    // Cliente del gateway de SMS
    let gateway = GatewayService::new(&config).expect("No se pudo inicializar GatewayService");

    let sms_service = SmsService::new(
        record_service.clone(),
        wallet_service.clone(),
        gateway.clone(),
    );
    let delivery_service = DeliveryService::new(record_service.clone(), gateway.clone());

    // Poller de estados: corre la reconciliación cada intervalo fijo.
    // Si una corrida falla, se loguea y se espera el próximo tick.
    let poller = delivery_service.clone();
    let poll_secs = config.status_poll_secs;
    tokio::spawn(async move {
        loop {
            if let Err(e) = poller.poll_pending().await {
                log::error!("Error en poller de estados: {:?}", e);
            }
            tokio::time::sleep(std::time::Duration::from_secs(poll_secs)).await;
        }
    });

    // Levantar servidor
    log::info!("Levantando servidor en {}", config.bind_addr);
    let bind_addr = config.bind_addr.clone();
    HttpServer::new(move || {
        App::new()
            // El back-office consume desde el browser: CORS permisivo,
            // responde también los pre-flight
            .wrap(Cors::permissive())
            .app_data(web::Data::new(record_service.clone()))
            .app_data(web::Data::new(wallet_service.clone()))
            .app_data(web::Data::new(sms_service.clone()))
            .app_data(web::Data::new(delivery_service.clone()))
            .configure(app::init_app)
    })
    .workers(1)
    .bind(bind_addr)?
    .run()
    .await
}
