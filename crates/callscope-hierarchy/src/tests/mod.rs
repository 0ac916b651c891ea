//! Unit tests for the callscope-hierarchy crate.

mod entity_tests {
    use rstest::rstest;

    use crate::entity::{CallableEntity, EntityKey, SymbolKind, TextSpan};

    #[test]
    fn span_end_is_exclusive() {
        let span = TextSpan::new(10, 5);
        assert_eq!(span.end(), 15);
        assert_eq!(TextSpan::from_bounds(10, 15), span);
        assert_eq!(TextSpan::from_bounds(15, 10).length, 0);
    }

    #[test]
    fn entity_defaults_selection_to_full_span() {
        let entity = CallableEntity::new(
            "render",
            SymbolKind::Method,
            "/src/view.ts",
            TextSpan::new(40, 30),
        );

        assert_eq!(entity.selection_span(), entity.span());
        assert_eq!(entity.key(), EntityKey::new("/src/view.ts", 40));
        assert!(entity.container().is_none());
        assert!(entity.modifiers().is_none());
    }

    #[test]
    fn entity_key_uses_selection_start() {
        let entity = CallableEntity::new(
            "render",
            SymbolKind::Method,
            "/src/view.ts",
            TextSpan::new(40, 30),
        )
        .with_selection_span(TextSpan::new(47, 6))
        .with_container("View")
        .with_modifiers("export,async");

        assert_eq!(entity.key().to_string(), "/src/view.ts@47");
        assert_eq!(entity.container(), Some("View"));
        assert_eq!(entity.modifiers(), Some("export,async"));
    }

    #[rstest]
    #[case("function", SymbolKind::Function)]
    #[case("method", SymbolKind::Method)]
    #[case("constructor", SymbolKind::Constructor)]
    #[case("getter", SymbolKind::Getter)]
    #[case("setter", SymbolKind::Setter)]
    #[case("call", SymbolKind::CallSite)]
    #[case("Local Function", SymbolKind::Function)]
    #[case("interface", SymbolKind::Unknown)]
    fn symbol_kind_from_tag(#[case] tag: &str, #[case] expected: SymbolKind) {
        assert_eq!(SymbolKind::from_tag(tag), expected);
    }

    #[rstest]
    #[case(lsp_types::SymbolKind::FUNCTION, SymbolKind::Function)]
    #[case(lsp_types::SymbolKind::METHOD, SymbolKind::Method)]
    #[case(lsp_types::SymbolKind::CONSTRUCTOR, SymbolKind::Constructor)]
    #[case(lsp_types::SymbolKind::CLASS, SymbolKind::Class)]
    #[case(lsp_types::SymbolKind::VARIABLE, SymbolKind::Unknown)]
    fn symbol_kind_from_lsp(#[case] kind: lsp_types::SymbolKind, #[case] expected: SymbolKind) {
        assert_eq!(SymbolKind::from_lsp(kind), expected);
    }
}

mod node_tests {
    use std::sync::Arc;

    use crate::entity::SymbolKind;
    use crate::node::{HierarchyNode, LineCharacter, NodeDetails, SourceRange};

    fn details(name: &str, container: Option<&str>) -> NodeDetails {
        let range = SourceRange::new(LineCharacter::new(1, 0), LineCharacter::new(1, 10));
        NodeDetails {
            name: name.to_owned(),
            kind: SymbolKind::Function,
            modifiers: None,
            container: container.map(str::to_owned),
            file: "/src/lib.ts".into(),
            range,
            selection_range: range,
        }
    }

    fn leaf(id: u32, name: &str) -> Arc<HierarchyNode> {
        Arc::new(HierarchyNode::new(id, details(name, None), false, Vec::new()))
    }

    #[test]
    fn service_lines_are_presented_one_based() {
        assert_eq!(LineCharacter::from_service(0, 4), LineCharacter::new(1, 4));
        assert_eq!(
            LineCharacter::from_service(u32::MAX, 0),
            LineCharacter::new(u32::MAX, 0)
        );
    }

    #[test]
    fn qualified_name_includes_container() {
        let node = HierarchyNode::new(1, details("method", Some("Foo")), false, Vec::new());
        assert_eq!(node.qualified_name(), "Foo.method");
        assert_eq!(leaf(2, "free").qualified_name(), "free");
    }

    #[test]
    fn push_child_refreshes_height_and_flag() {
        let inner = HierarchyNode::new(2, details("inner", None), true, vec![leaf(3, "leaf")]);
        let mut root = HierarchyNode::new(1, details("root", None), false, Vec::new());
        assert_eq!(root.height(), 0);

        root.push_child(Arc::new(inner));

        assert!(root.has_children());
        assert_eq!(root.height(), 2);
    }

    #[test]
    fn find_by_name_searches_descendants() {
        let method = HierarchyNode::new(3, details("draw", Some("Canvas")), false, Vec::new());
        let root = HierarchyNode::new(
            1,
            details("main", None),
            true,
            vec![leaf(2, "setup"), Arc::new(method)],
        );

        assert_eq!(root.find_by_name("setup").map(HierarchyNode::id), Some(2));
        assert_eq!(root.find_by_name("Canvas.draw").map(HierarchyNode::id), Some(3));
        assert!(root.find_by_name("missing").is_none());
    }
}

mod support;
