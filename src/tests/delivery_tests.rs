//! tests/delivery_tests.rs
//! Pruebas de la reconciliación de estados: callback push y poller.

#[cfg(test)]
mod tests {
    use actix_rt::test;
    use actix_web::http::StatusCode;
    use actix_web::{web, App, HttpResponse, HttpServer};
    use serde_json::{json, Value};

    use crate::handlers::callback_handler::sms_callback_endpoint;
    use crate::models::sms_model::{CallbackRequest, NewSmsRecord};
    use crate::services::delivery_service::{classify_delivery_code, DeliveryService};
    use crate::services::gateway_service::GatewayService;
    use crate::services::sms_record_service::SmsRecordService;
    use crate::tests::{gateway_config, setup_pool, test_config};

    fn pending_record(tenant_id: &str, mid: &str) -> NewSmsRecord {
        NewSmsRecord {
            tenant_id: tenant_id.to_string(),
            mid: Some(mid.to_string()),
            recipients: vec!["+8613800000000".to_string()],
            content: "test".to_string(),
            sms_type: "notice".to_string(),
            template_name: "t1".to_string(),
            status: "success".to_string(),
            delivery_status: Some("pending".to_string()),
            delivery_message: None,
            created_by: None,
        }
    }

    /// Gateway de mentira para el poller: responde /query según el mid.
    async fn spawn_query_gateway() -> String {
        let server = HttpServer::new(|| {
            App::new().route(
                "/query",
                web::post().to(|body: web::Json<Value>| async move {
                    let mid = body.get("mid").and_then(|v| v.as_str()).unwrap_or("");
                    if mid == "MBAD" {
                        HttpResponse::InternalServerError().body("gateway exploded")
                    } else if mid == "MFAIL" {
                        HttpResponse::Ok().json(json!({ "status": "1", "message": "undelivered" }))
                    } else {
                        HttpResponse::Ok().json(json!({ "status": "0", "message": "ok" }))
                    }
                }),
            )
        })
        .workers(1)
        .bind(("127.0.0.1", 0))
        .expect("No se pudo bindear el gateway de prueba");

        let addr = server.addrs()[0];
        actix_rt::spawn(server.run());
        format!("http://{}", addr)
    }

    #[test]
    async fn test_classify_delivery_code() {
        assert_eq!(classify_delivery_code("0"), ("delivered", "success"));
        assert_eq!(classify_delivery_code("1"), ("failed", "failed"));
        assert_eq!(classify_delivery_code("TIMEOUT"), ("failed", "failed"));
        assert_eq!(classify_delivery_code(""), ("failed", "failed"));
    }

    #[test]
    async fn test_handle_callback_delivers() {
        let record_service = SmsRecordService::new(setup_pool().await);
        let gateway = GatewayService::new(&test_config()).unwrap();
        let delivery = DeliveryService::new(record_service.clone(), gateway);

        let id = record_service
            .create_record(pending_record("t1", "M1"))
            .await
            .unwrap();

        let updated = delivery
            .handle_callback("M1", "0", Some("ok".to_string()))
            .await
            .unwrap();
        assert!(updated);

        let record = record_service.get_record("t1", &id).await.unwrap();
        assert_eq!(record.status, "success");
        assert_eq!(record.delivery_status.as_deref(), Some("delivered"));
        assert_eq!(record.delivery_code.as_deref(), Some("0"));
        assert_eq!(record.delivery_message.as_deref(), Some("ok"));
        assert!(record.delivery_time.is_some());
    }

    #[test]
    async fn test_handle_callback_failure_code() {
        let record_service = SmsRecordService::new(setup_pool().await);
        let gateway = GatewayService::new(&test_config()).unwrap();
        let delivery = DeliveryService::new(record_service.clone(), gateway);

        let id = record_service
            .create_record(pending_record("t1", "M1"))
            .await
            .unwrap();

        let updated = delivery
            .handle_callback("M1", "1", Some("undelivered".to_string()))
            .await
            .unwrap();
        assert!(updated);

        let record = record_service.get_record("t1", &id).await.unwrap();
        assert_eq!(record.status, "failed");
        assert_eq!(record.delivery_status.as_deref(), Some("failed"));
        assert_eq!(record.delivery_code.as_deref(), Some("1"));
    }

    #[test]
    async fn test_handle_callback_unknown_mid() {
        let record_service = SmsRecordService::new(setup_pool().await);
        let gateway = GatewayService::new(&test_config()).unwrap();
        let delivery = DeliveryService::new(record_service, gateway);

        // No debe fallar: se loguea y el proveedor recibe un 200
        let updated = delivery.handle_callback("NOPE", "0", None).await.unwrap();
        assert!(!updated);
    }

    #[test]
    async fn test_handle_callback_idempotent_replay() {
        let record_service = SmsRecordService::new(setup_pool().await);
        let gateway = GatewayService::new(&test_config()).unwrap();
        let delivery = DeliveryService::new(record_service.clone(), gateway);

        let id = record_service
            .create_record(pending_record("t1", "M1"))
            .await
            .unwrap();

        let first = delivery
            .handle_callback("M1", "0", Some("ok".to_string()))
            .await
            .unwrap();
        let second = delivery
            .handle_callback("M1", "0", Some("ok".to_string()))
            .await
            .unwrap();
        assert!(first);
        assert!(!second);

        // Aplicar dos veces deja el mismo estado final que aplicar una
        let record = record_service.get_record("t1", &id).await.unwrap();
        assert_eq!(record.delivery_status.as_deref(), Some("delivered"));
        assert_eq!(record.delivery_code.as_deref(), Some("0"));
    }

    #[test]
    async fn test_handle_callback_stale_conflict_keeps_first() {
        let record_service = SmsRecordService::new(setup_pool().await);
        let gateway = GatewayService::new(&test_config()).unwrap();
        let delivery = DeliveryService::new(record_service.clone(), gateway);

        let id = record_service
            .create_record(pending_record("t1", "M1"))
            .await
            .unwrap();

        delivery
            .handle_callback("M1", "0", Some("ok".to_string()))
            .await
            .unwrap();
        // Reintento viejo con veredicto contrario: no puede revertir
        let stale = delivery
            .handle_callback("M1", "1", Some("undelivered".to_string()))
            .await
            .unwrap();
        assert!(!stale);

        let record = record_service.get_record("t1", &id).await.unwrap();
        assert_eq!(record.delivery_status.as_deref(), Some("delivered"));
    }

    #[test]
    async fn test_callback_endpoint_missing_mid() {
        let record_service = SmsRecordService::new(setup_pool().await);
        let gateway = GatewayService::new(&test_config()).unwrap();
        let delivery =
            web::Data::new(DeliveryService::new(record_service.clone(), gateway));

        let id = record_service
            .create_record(pending_record("t1", "M1"))
            .await
            .unwrap();

        let body = web::Json(CallbackRequest {
            mid: None,
            status: "0".to_string(),
            message: None,
            receive_time: None,
        });
        let resp = sms_callback_endpoint(delivery, body).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        // Sin mid no se toca el store
        let record = record_service.get_record("t1", &id).await.unwrap();
        assert_eq!(record.delivery_status.as_deref(), Some("pending"));
    }

    #[test]
    async fn test_poll_no_pending() {
        let record_service = SmsRecordService::new(setup_pool().await);
        // Gateway inalcanzable: sin pendientes no hay llamadas que hacer
        let gateway = GatewayService::new(&test_config()).unwrap();
        let delivery = DeliveryService::new(record_service, gateway);

        let result = delivery.poll_pending().await.unwrap();
        assert_eq!(result.total_processed, 0);
        assert_eq!(result.total_updated, 0);
        assert!(result.updates.is_empty());
    }

    #[test]
    async fn test_poll_skips_terminal_records() {
        let record_service = SmsRecordService::new(setup_pool().await);
        let gateway = GatewayService::new(&test_config()).unwrap();
        let delivery = DeliveryService::new(record_service.clone(), gateway);

        let mut terminal = pending_record("t1", "M1");
        terminal.delivery_status = Some("delivered".to_string());
        record_service.create_record(terminal).await.unwrap();

        // Si el poller intentara consultarlo, el gateway inalcanzable
        // lo dejaría como "procesado sin update"; ni siquiera lo toma.
        let result = delivery.poll_pending().await.unwrap();
        assert_eq!(result.total_processed, 0);
    }

    #[test]
    async fn test_poll_updates_pending() {
        let record_service = SmsRecordService::new(setup_pool().await);
        let base_url = spawn_query_gateway().await;
        let gateway = GatewayService::new(&gateway_config(&base_url)).unwrap();
        let delivery = DeliveryService::new(record_service.clone(), gateway);

        let ok_id = record_service
            .create_record(pending_record("t1", "M1"))
            .await
            .unwrap();
        let fail_id = record_service
            .create_record(pending_record("t1", "MFAIL"))
            .await
            .unwrap();

        let result = delivery.poll_pending().await.unwrap();
        assert_eq!(result.total_processed, 2);
        assert_eq!(result.total_updated, 2);

        let ok_record = record_service.get_record("t1", &ok_id).await.unwrap();
        assert_eq!(ok_record.delivery_status.as_deref(), Some("delivered"));
        assert_eq!(ok_record.delivery_code.as_deref(), Some("0"));

        let fail_record = record_service.get_record("t1", &fail_id).await.unwrap();
        assert_eq!(fail_record.delivery_status.as_deref(), Some("failed"));
        assert_eq!(fail_record.delivery_code.as_deref(), Some("1"));
    }

    #[test]
    async fn test_poll_one_failure_does_not_stop_batch() {
        let record_service = SmsRecordService::new(setup_pool().await);
        let base_url = spawn_query_gateway().await;
        let gateway = GatewayService::new(&gateway_config(&base_url)).unwrap();
        let delivery = DeliveryService::new(record_service.clone(), gateway);

        let bad_id = record_service
            .create_record(pending_record("t1", "MBAD"))
            .await
            .unwrap();
        let ok_id = record_service
            .create_record(pending_record("t1", "M1"))
            .await
            .unwrap();

        let result = delivery.poll_pending().await.unwrap();
        assert_eq!(result.total_processed, 2);
        assert_eq!(result.total_updated, 1);
        assert_eq!(result.updates[0].mid, "M1");

        let ok_record = record_service.get_record("t1", &ok_id).await.unwrap();
        assert_eq!(ok_record.delivery_status.as_deref(), Some("delivered"));

        // El que falló queda pendiente para el próximo ciclo
        let bad_record = record_service.get_record("t1", &bad_id).await.unwrap();
        assert_eq!(bad_record.delivery_status.as_deref(), Some("pending"));
    }
}
