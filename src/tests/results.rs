#[cfg(test)]
mod results {
    use crate::error::WashError;
    use crate::traversal::{ResultNode, ResultValue};

    fn text(value: &str) -> ResultValue {
        ResultValue::Text(value.to_string())
    }

    fn node(entries: Vec<(&str, ResultValue)>) -> ResultNode {
        let mut node = ResultNode::new();
        for (key, value) in entries {
            node.add(key, value).unwrap();
        }
        node
    }

    #[test]
    fn keys_keep_insertion_order() {
        let result = node(vec![("b", text("1")), ("a", text("2"))]);
        assert_eq!(result.keys().collect::<Vec<_>>(), vec!["b", "a"]);
        assert_eq!(result.to_json().unwrap(), r#"{"b":"1","a":"2"}"#);
    }

    #[test]
    fn merge_disjoint_nodes() {
        let mut result = node(vec![("a", text("1"))]);
        result.merge(node(vec![("b", text("2"))])).unwrap();
        assert_eq!(result.to_json().unwrap(), r#"{"a":"1","b":"2"}"#);
    }

    #[test]
    fn scalar_is_replaced() {
        let mut result = node(vec![("a", text("1"))]);
        result.add("a", text("2")).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result.get("a"), Some(&text("2")));

        result.add("a", ResultValue::Null).unwrap();
        assert_eq!(result.to_json().unwrap(), r#"{"a":null}"#);
    }

    #[test]
    fn nested_nodes_merge_recursively() {
        let mut result = node(vec![(
            "page",
            ResultValue::Node(node(vec![("title", text("t")), ("meta", ResultValue::Node(node(vec![("x", text("1"))])))])),
        )]);
        result
            .add(
                "page",
                ResultValue::Node(node(vec![("meta", ResultValue::Node(node(vec![("y", text("2"))])))])),
            )
            .unwrap();
        assert_eq!(
            result.to_json().unwrap(),
            r#"{"page":{"title":"t","meta":{"x":"1","y":"2"}}}"#
        );
    }

    #[test]
    fn lists_merge_element_wise() {
        let mut value = ResultValue::List(vec![
            ResultValue::Node(node(vec![("a", text("1"))])),
            ResultValue::Node(node(vec![("a", text("2"))])),
        ]);
        value
            .merge(ResultValue::List(vec![
                ResultValue::Node(node(vec![("b", text("x"))])),
                ResultValue::Node(node(vec![("b", text("y"))])),
            ]))
            .unwrap();

        let json = serde_json::to_string(&value).unwrap();
        assert_eq!(json, r#"[{"a":"1","b":"x"},{"a":"2","b":"y"}]"#);
    }

    #[test]
    fn list_length_mismatch() {
        let mut value = ResultValue::List(vec![text("1"), text("2"), text("3")]);
        let err = value.merge(ResultValue::List(vec![text("1"), text("2")])).unwrap_err();
        assert!(matches!(err, WashError::Runtime(_)));
    }

    #[test]
    fn different_shapes_are_replaced() {
        let mut value = ResultValue::Node(node(vec![("a", text("1"))]));
        value.merge(ResultValue::List(vec![text("x")])).unwrap();
        assert_eq!(value, ResultValue::List(vec![text("x")]));
    }

    #[test]
    fn empty_list_serializes() {
        let result = node(vec![("items", ResultValue::List(Vec::new()))]);
        assert_eq!(result.to_json().unwrap(), r#"{"items":[]}"#);
    }
}
