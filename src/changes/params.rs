use serde_json::json;

use super::{Mode, LONGPOLL_TIMEOUT};
use crate::database::types::{ChangesRequest, ChangesRequestParams, Feed, PostChangesParams};
use crate::error::LoungeError;

/// Check that the user params can drive a followed feed. Offending options are
/// all reported in a single message.
pub(crate) fn validate(params: &PostChangesParams) -> Result<(), LoungeError> {
    if params.db.is_empty() {
        return Err(LoungeError::InvalidArgument(
            "The param db is required for PostChangesParams.".to_string(),
        ));
    }
    let mut invalid = vec![];
    if params.descending {
        invalid.push("descending");
    }
    if !params.feed.is_empty() {
        invalid.push("feed");
    }
    if params.heartbeat != 0 {
        invalid.push("heartbeat");
    }
    if !params.last_event_id.is_empty() {
        invalid.push("last_event_id");
    }
    if params.timeout != 0 {
        invalid.push("timeout");
    }
    if !params.filter.is_empty() && params.filter != "_selector" {
        invalid.push("filter");
    }
    if !invalid.is_empty() {
        let names = invalid
            .iter()
            .map(|name| format!("'{}'", name))
            .collect::<Vec<String>>()
            .join(", ");
        let message = if invalid.len() == 1 {
            format!("The param {} is invalid when using ChangesFollower.", names)
        } else {
            format!("The params {} are invalid when using ChangesFollower.", names)
        };
        return Err(LoungeError::InvalidArgument(message));
    }
    Ok(())
}

/// Assemble one `_changes` request from the user params, overlaying the
/// follower owned options. The wire struct has no slots for the forbidden
/// options so they cannot survive into a request, `feed` and `timeout` are set
/// here based on the mode. Building twice from the same inputs yields equal
/// requests.
pub(crate) fn request(
    params: &PostChangesParams,
    mode: Mode,
    since: &str,
    limit: i64,
) -> ChangesRequest {
    let (feed, timeout) = match mode {
        Mode::Finite => (Feed::Normal, 0),
        Mode::Listen => (Feed::LongPoll, LONGPOLL_TIMEOUT as i64),
    };
    let query = ChangesRequestParams {
        att_encoding_info: params.att_encoding_info,
        attachments: params.attachments,
        conflicts: params.conflicts,
        feed: feed.to_string(),
        filter: params.filter.clone(),
        include_docs: params.include_docs,
        limit,
        seq_interval: params.seq_interval,
        since: since.to_string(),
        style: params.style.clone(),
        timeout,
        view: params.view.clone(),
    };
    let mut body = json!({});
    if !params.doc_ids.is_empty() {
        body["doc_ids"] = json!(params.doc_ids);
    }
    if !params.selector.is_null() {
        body["selector"] = params.selector.clone();
    }
    if !params.fields.is_empty() {
        body["fields"] = json!(params.fields);
    }
    ChangesRequest {
        db: params.db.clone(),
        query,
        body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::types::{Filter, Style};
    use crate::ParseQueryParams;

    #[test]
    fn db_is_required() {
        let err = validate(&PostChangesParams::new("")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "The param db is required for PostChangesParams."
        );
    }

    #[test]
    fn rejects_a_single_forbidden_param() {
        let params = PostChangesParams::new("my_db").feed(Feed::Continuous);
        let err = validate(&params).unwrap_err();
        assert_eq!(
            err.to_string(),
            "The param 'feed' is invalid when using ChangesFollower."
        );
    }

    #[test]
    fn reports_every_offending_param_at_once() {
        let params = PostChangesParams::new("my_db")
            .descending(true)
            .heartbeat(60000)
            .timeout(5000);
        let err = validate(&params).unwrap_err();
        assert_eq!(
            err.to_string(),
            "The params 'descending', 'heartbeat', 'timeout' are invalid when using ChangesFollower."
        );
    }

    #[test]
    fn selector_is_the_only_accepted_filter() {
        let accepted = PostChangesParams::new("my_db")
            .filter(Filter::Selector)
            .selector(serde_json::json!({ "_id": { "$regex": "^_design/" } }));
        assert!(validate(&accepted).is_ok());

        let rejected = PostChangesParams::new("my_db").filter(Filter::DocIds);
        let err = validate(&rejected).unwrap_err();
        assert_eq!(
            err.to_string(),
            "The param 'filter' is invalid when using ChangesFollower."
        );
    }

    #[test]
    fn finite_requests_use_a_normal_feed_without_timeout() {
        let params = PostChangesParams::new("my_db").include_docs(true);
        let request = request(&params, Mode::Finite, "0", 500);
        assert_eq!(request.query.feed, "normal");
        assert_eq!(request.query.timeout, 0);
        assert_eq!(request.query.limit, 500);
        let query_string = request.query.parse_params();
        assert!(query_string.contains("feed=normal&"));
        assert!(!query_string.contains("timeout="));
    }

    #[test]
    fn listen_requests_long_poll_below_the_client_timeout() {
        let params = PostChangesParams::new("my_db");
        let request = request(&params, Mode::Listen, "now", 10000);
        assert_eq!(request.query.feed, "longpoll");
        assert_eq!(request.query.timeout, 57000);
        assert_eq!(request.query.since, "now");
    }

    #[test]
    fn forbidden_options_cannot_survive_into_a_request() {
        let params = PostChangesParams::new("my_db")
            .descending(true)
            .heartbeat(60000)
            .last_event_id("42")
            .style(Style::AllDocs);
        let request = request(&params, Mode::Listen, "now", 100);
        let query_string = request.query.parse_params();
        assert!(!query_string.contains("descending"));
        assert!(!query_string.contains("heartbeat"));
        assert!(!query_string.contains("last_event_id"));
        assert!(query_string.contains("style=all_docs&"));
    }

    #[test]
    fn request_building_is_pure() {
        let params = PostChangesParams::new("my_db")
            .doc_ids(vec!["a", "b"])
            .seq_interval(100);
        let first = request(&params, Mode::Listen, "55-abc", 100);
        let second = request(&params, Mode::Listen, "55-abc", 100);
        assert_eq!(first.query.parse_params(), second.query.parse_params());
        assert_eq!(first.body, second.body);
        assert_eq!(first.db, second.db);
    }

    #[test]
    fn body_carries_the_document_filters() {
        let params = PostChangesParams::new("my_db").doc_ids(vec!["one", "two"]);
        let req = request(&params, Mode::Finite, "0", 100);
        assert_eq!(req.body, serde_json::json!({ "doc_ids": ["one", "two"] }));

        let params = PostChangesParams::new("my_db")
            .filter(Filter::Selector)
            .selector(serde_json::json!({ "year": { "$gt": 2010 } }))
            .fields(vec!["_id", "year"]);
        let req = request(&params, Mode::Finite, "0", 100);
        assert_eq!(
            req.body,
            serde_json::json!({
                "selector": { "year": { "$gt": 2010 } },
                "fields": ["_id", "year"]
            })
        );

        let req = request(&PostChangesParams::new("my_db"), Mode::Finite, "0", 100);
        assert_eq!(req.body, serde_json::json!({}));
    }
}
