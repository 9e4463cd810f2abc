use std::time::Duration;

use healthnav_backend_client::BackendClient;
use healthnav_cascade::FetchError;
use healthnav_cascade::OptionItem;
use healthnav_cascade::flows::ReferralRequest;
use pretty_assertions::assert_eq;
use wiremock::Mock;
use wiremock::MockServer;
use wiremock::ResponseTemplate;
use wiremock::matchers::body_json;
use wiremock::matchers::method;
use wiremock::matchers::path;
use wiremock::matchers::query_param;

async fn client_for(server: &MockServer) -> BackendClient {
    BackendClient::new(&server.uri()).expect("client")
}

#[tokio::test]
async fn referral_states_decode_a_plain_string_list() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/states"))
        .respond_with(ResponseTemplate::new(200).set_body_json(vec!["Bihar", "Kerala"]))
        .mount(&server)
        .await;

    let states = client_for(&server).await.referral_states().await.expect("states");
    assert_eq!(states, vec!["Bihar".to_string(), "Kerala".to_string()]);
}

#[tokio::test]
async fn referral_paths_carry_percent_encoded_place_names() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/subdistricts/Tamil%20Nadu/The%20Nilgiris"))
        .respond_with(ResponseTemplate::new(200).set_body_json(vec!["Coonoor"]))
        .mount(&server)
        .await;

    let subdistricts = client_for(&server)
        .await
        .referral_subdistricts("Tamil Nadu", "The Nilgiris")
        .await
        .expect("subdistricts");
    assert_eq!(subdistricts, vec!["Coonoor".to_string()]);
}

#[tokio::test]
async fn non_2xx_surfaces_status_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/states"))
        .respond_with(ResponseTemplate::new(503).set_body_string("db down"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .await
        .referral_states()
        .await
        .expect_err("should fail");
    assert_eq!(
        err,
        FetchError::Http {
            status: 503,
            body: "db down".to_string(),
        }
    );
}

#[tokio::test]
async fn referral_search_extracts_structured_error_bodies() {
    let server = MockServer::start().await;
    let request = ReferralRequest {
        selected_state: "Bihar".to_string(),
        selected_district: "Patna".to_string(),
        selected_subdistrict: "Phulwari".to_string(),
        selected_facility_name: "Nowhere SC".to_string(),
    };
    Mock::given(method("POST"))
        .and(path("/api/referral"))
        .and(body_json(&request))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_json(serde_json::json!({"error": "Start facility not found."})),
        )
        .mount(&server)
        .await;

    let err = client_for(&server)
        .await
        .referral_search(&request)
        .await
        .expect_err("should fail");
    assert_eq!(err, FetchError::Backend("Start facility not found.".to_string()));
}

#[tokio::test]
async fn referral_search_decodes_the_result_shape() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/referral"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "startFacility": {
                "Facility Name": "Anandpur SC",
                "Facility Type": "SUB_CEN",
                "District Name": "Patna",
                "Latitude": 25.59,
                "Longitude": 85.13
            },
            "closestNextLevelFacility": {
                "Facility Name": "Phulwari PHC",
                "Facility Type": "PHC",
                "District Name": "Patna",
                "Latitude": 25.58,
                "Longitude": 85.08,
                "Distance (km)": 6.42
            },
            "allNextLevelFacilities": []
        })))
        .mount(&server)
        .await;

    let request = ReferralRequest {
        selected_state: "Bihar".to_string(),
        selected_district: "Patna".to_string(),
        selected_subdistrict: "Phulwari".to_string(),
        selected_facility_name: "Anandpur SC".to_string(),
    };
    let results = client_for(&server)
        .await
        .referral_search(&request)
        .await
        .expect("results");
    assert_eq!(results.start_facility.name, "Anandpur SC");
    assert_eq!(
        results
            .closest_next_level_facility
            .expect("closest")
            .distance_km,
        Some(6.42)
    );
}

#[tokio::test]
async fn kpi_districts_map_ids_to_values_and_names_to_labels() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/kpi/districts"))
        .and(query_param("state", "Bihar"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {"district_id": 101, "district_name": "Patna"},
            {"district_id": 102, "district_name": "Gaya"}
        ])))
        .mount(&server)
        .await;

    let districts = client_for(&server)
        .await
        .kpi_districts("Bihar")
        .await
        .expect("districts");
    assert_eq!(
        districts,
        vec![
            OptionItem::new("101", "Patna"),
            OptionItem::new("102", "Gaya"),
        ]
    );
}

#[tokio::test]
async fn kpi_years_accept_numbers_and_strings() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/kpi/available-years"))
        .and(query_param("districtId", "101"))
        .and(query_param("source", "NFHS"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([2019, "2020-21"])))
        .mount(&server)
        .await;

    let years = client_for(&server)
        .await
        .kpi_years("101", "NFHS")
        .await
        .expect("years");
    assert_eq!(
        years,
        vec![OptionItem::plain("2019"), OptionItem::plain("2020-21")]
    );
}

#[tokio::test]
async fn kpi_data_decodes_rows_with_nullable_fields() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/kpi/kpi-data"))
        .and(query_param("districtId", "101"))
        .and(query_param("source", "NFHS"))
        .and(query_param("year", "2020"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {"kpi_id": 1, "kpi_name": "IMR", "kpi_value": "34.2", "unit": "per 1000",
             "category": null, "state_name": "Bihar", "district_name": "Patna"}
        ])))
        .mount(&server)
        .await;

    let rows = client_for(&server)
        .await
        .kpi_data("101", "NFHS", "2020")
        .await
        .expect("rows");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].kpi_value, Some(34.2));
    assert_eq!(rows[0].category, None);
}

#[tokio::test]
async fn slow_responses_surface_as_timeouts() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/states"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(Vec::<String>::new())
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let client =
        BackendClient::with_timeout(&server.uri(), Duration::from_millis(50)).expect("client");
    let err = client.referral_states().await.expect_err("should time out");
    assert_eq!(err, FetchError::Timeout);
}
