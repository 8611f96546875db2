use crate::gateway::signal::{parse_success_signal, SuccessSignal};
use crate::gateway::{decode_envelope, GatewayError};
use crate::model::{records_for_request, AnalysisRecord, AnalysisRequest};
use crate::session::ViewSession;
use crate::table::pager::{compute_visible_pages, PageWindow, DEFAULT_MAX_VISIBLE};
use crate::table::{sort_records, SortDirection, SortField, SortSpec};

#[test]
fn success_marker_wins_regardless_of_surrounding_garbage() {
    let raw = concat!(
        "DCS GATEWAY v2.4 session opened\n",
        "<<< channel scan >>>\n",
        "{\"diag\":\"buffer flushed\"}\n",
        "[{\"sukses\":\"1\"}]\n",
        "session closed\n",
    );
    assert_eq!(parse_success_signal(raw), SuccessSignal::Confirmed);
}

#[test]
fn negative_and_broken_fragments_stay_unconfirmed() {
    let raw = "not json\n{broken\n[{\"sukses\":\"0\"}]";
    assert_eq!(parse_success_signal(raw), SuccessSignal::Unconfirmed);
    assert_eq!(parse_success_signal(""), SuccessSignal::Unconfirmed);
}

#[test]
fn sort_spec_toggle_transitions() {
    let spec = SortSpec {
        field: SortField::ObservedValue,
        direction: SortDirection::Ascending,
    };
    let flipped = spec.toggled(SortField::ObservedValue);
    assert_eq!(flipped.direction, SortDirection::Descending);

    let reset = SortSpec {
        field: SortField::ObservedValue,
        direction: SortDirection::Descending,
    }
    .toggled(SortField::Sequence);
    assert_eq!(reset.field, SortField::Sequence);
    assert_eq!(reset.direction, SortDirection::Ascending);
}

#[test]
fn visible_pages_match_contract_cases() {
    assert_eq!(
        compute_visible_pages(1, 10, DEFAULT_MAX_VISIBLE),
        vec![1, 2, 3, 4, 5]
    );
    assert_eq!(
        compute_visible_pages(10, 10, DEFAULT_MAX_VISIBLE),
        vec![6, 7, 8, 9, 10]
    );
    assert_eq!(
        compute_visible_pages(5, 10, DEFAULT_MAX_VISIBLE),
        vec![3, 4, 5, 6, 7]
    );
    assert_eq!(compute_visible_pages(3, 2, DEFAULT_MAX_VISIBLE), vec![1, 2]);
}

#[test]
fn tied_sort_keys_keep_insertion_order() {
    let mut records = vec![
        AnalysisRecord::new(1, 1, "Main Steam Temperature", "degC", 566.0, 570.0),
        AnalysisRecord::new(2, 2, "Reheat Steam Temperature", "degC", 566.0, 570.0),
    ];
    sort_records(
        &mut records,
        SortSpec {
            field: SortField::ObservedValue,
            direction: SortDirection::Ascending,
        },
    );
    assert_eq!(records[0].sequence, 1);
    assert_eq!(records[1].sequence, 2);
}

#[test]
fn page_navigation_round_trip_clamps_to_first_page() {
    let mut window = PageWindow::new(5);
    window.set_total_count(40);
    window.go_to_page(5);
    window.go_to_page(-100);
    assert_eq!(window.current_page(), 1);
}

#[test]
fn envelope_decode_covers_the_error_taxonomy() {
    // malformed body, bounded excerpt
    match decode_envelope(200, "<html>fault page</html>") {
        Err(GatewayError::Malformed { excerpt }) => assert!(excerpt.starts_with("<html>")),
        other => panic!("expected Malformed, got {other:?}"),
    }
    // http failure surfaces the envelope message
    match decode_envelope(
        503,
        r#"{"success":false,"message":"historian busy","data":""}"#,
    ) {
        Err(GatewayError::Http { status, message }) => {
            assert_eq!(status, 503);
            assert_eq!(message, "historian busy");
        }
        other => panic!("expected Http, got {other:?}"),
    }
    // logical failure on a healthy transport
    match decode_envelope(200, r#"{"success":false,"message":"no data","data":""}"#) {
        Err(GatewayError::Logical { message }) => assert_eq!(message, "no data"),
        other => panic!("expected Logical, got {other:?}"),
    }
    // full success passes the envelope through
    let envelope = decode_envelope(200, r#"{"success":true,"data":"[{\"sukses\":\"1\"}]"}"#).unwrap();
    assert_eq!(
        parse_success_signal(&envelope.data),
        SuccessSignal::Confirmed
    );
}

// End-to-end over the presentation pipeline: install a snapshot, sort it,
// page it, and read back the visible rows the way the CLI does.
#[test]
fn snapshot_to_table_pipeline() {
    let request = AnalysisRequest::new("PLTU-3", "2024-03-01 07:30:00");
    let mut session = ViewSession::new(5);

    let token = session.submit_begin();
    assert!(session.busy());
    assert!(session.submit_complete(token, records_for_request(&request)));

    session.sort_by(SortField::Gap);
    let ascending: Vec<f64> = session.records().iter().map(|r| r.gap).collect();
    let mut expected = ascending.clone();
    expected.sort_by(|a, b| a.total_cmp(b));
    assert_eq!(ascending, expected);

    session.sort_by(SortField::Gap); // toggle to descending
    let first_gap = session.records()[0].gap;
    assert_eq!(
        first_gap,
        expected.last().copied().unwrap_or(f64::NEG_INFINITY)
    );

    session.go_to_page(3);
    let window = session.window();
    assert_eq!(window.range_start(), 11);
    assert_eq!(window.range_end(), window.total_count().min(15));
    assert!(!session.page_records().is_empty());
    assert!(!session.visible_pages(DEFAULT_MAX_VISIBLE).is_empty());
}

// A second submission issued while the first is outstanding must win the
// table even when the first response arrives last.
#[test]
fn superseded_response_never_overwrites_newer_snapshot() {
    let older = AnalysisRequest::new("PLTU-3", "2024-03-01 07:30:00");
    let newer = AnalysisRequest::new("PLTU-3", "2024-03-01 08:30:00");
    let mut session = ViewSession::new(10);

    let older_token = session.submit_begin();
    let newer_token = session.submit_begin();

    assert!(session.submit_complete(newer_token, records_for_request(&newer)));
    let installed: Vec<f64> = session.records().iter().map(|r| r.observed_value).collect();

    assert!(!session.submit_complete(older_token, records_for_request(&older)));
    let after: Vec<f64> = session.records().iter().map(|r| r.observed_value).collect();
    assert_eq!(installed, after);
}
