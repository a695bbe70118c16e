//! tests/gateway_tests.rs
//! Validación de las respuestas JSON del gateway (shape sin esquema).

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::services::gateway_service::GatewayService;

    fn phones() -> Vec<String> {
        vec!["+8613800000000".to_string(), "+8613800000001".to_string()]
    }

    #[test]
    fn test_parse_send_response_full_success() {
        let value = json!({
            "code": 0,
            "mid": "M1",
            "success_count": 2,
            "fail_count": 0
        });

        let outcome = GatewayService::parse_send_response(&value, &phones()).unwrap();
        assert_eq!(outcome.mid.as_deref(), Some("M1"));
        assert_eq!(outcome.success_count, 2);
        assert_eq!(outcome.fail_count, 0);
        assert!(outcome.details.is_empty());
    }

    #[test]
    fn test_parse_send_response_with_details() {
        let value = json!({
            "code": 0,
            "mid": "M1",
            "success_count": 1,
            "fail_count": 1,
            "details": [
                { "phone": "+8613800000000", "status": "success" },
                { "phone": "+8613800000001", "status": "failed", "message": "blacklisted" }
            ]
        });

        let outcome = GatewayService::parse_send_response(&value, &phones()).unwrap();
        assert_eq!(outcome.details.len(), 2);
        assert_eq!(outcome.details[1].status, "failed");
        assert_eq!(outcome.details[1].message.as_deref(), Some("blacklisted"));
    }

    #[test]
    fn test_parse_send_response_rejected_batch() {
        // code != 0: rechazo total, es dato (no error de transporte)
        let value = json!({ "code": 5, "message": "auth failed" });

        let outcome = GatewayService::parse_send_response(&value, &phones()).unwrap();
        assert!(outcome.mid.is_none());
        assert_eq!(outcome.success_count, 0);
        assert_eq!(outcome.fail_count, 2);
        assert!(outcome
            .details
            .iter()
            .all(|d| d.status == "failed" && d.message.as_deref() == Some("auth failed")));
    }

    #[test]
    fn test_parse_send_response_missing_counts() {
        let value = json!({ "code": 0, "mid": "M1" });
        assert!(GatewayService::parse_send_response(&value, &phones()).is_err());
    }

    #[test]
    fn test_parse_send_response_missing_code() {
        let value = json!({ "mid": "M1", "success_count": 1, "fail_count": 0 });
        assert!(GatewayService::parse_send_response(&value, &phones()).is_err());
    }

    #[test]
    fn test_parse_send_response_accepted_without_mid() {
        // Aceptó mensajes pero no devolvió mid: no habría cómo reconciliar
        let value = json!({ "code": 0, "success_count": 1, "fail_count": 0 });
        assert!(GatewayService::parse_send_response(&value, &phones()).is_err());
    }

    #[test]
    fn test_parse_send_response_malformed_detail() {
        let value = json!({
            "code": 0,
            "mid": "M1",
            "success_count": 1,
            "fail_count": 1,
            "details": [ { "status": "failed" } ]
        });
        assert!(GatewayService::parse_send_response(&value, &phones()).is_err());
    }

    #[test]
    fn test_parse_status_response_ok() {
        let value = json!({
            "status": "0",
            "message": "ok",
            "receive_time": "2026-08-07 10:00:00"
        });

        let outcome = GatewayService::parse_status_response(&value).unwrap();
        assert_eq!(outcome.code, "0");
        assert_eq!(outcome.message.as_deref(), Some("ok"));
        assert_eq!(outcome.receive_time.as_deref(), Some("2026-08-07 10:00:00"));
    }

    #[test]
    fn test_parse_status_response_missing_status() {
        let value = json!({ "message": "ok" });
        assert!(GatewayService::parse_status_response(&value).is_err());
    }
}
