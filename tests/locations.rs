//! Positions, parent linkage and tree lookup on parsed scripts

use cfml_parser::cfml::ast::lookup::{find_by_id, node_at_offset, ParentIndex};
use cfml_parser::cfml::ast::snapshot::snapshot_statement;
use cfml_parser::cfml::ast::traits::NodeRef;
use cfml_parser::cfml::testing::{assert_stmt, parse_script};
use std::collections::HashSet;

const SOURCE: &str = "x = 1;\nfunction f(a) {\n  return a + 1;\n}\ng = function(b) { return b; };\n";

fn all_nodes(root: NodeRef<'_>) -> Vec<NodeRef<'_>> {
    let mut nodes = vec![root];
    for child in root.children() {
        nodes.extend(all_nodes(child));
    }
    nodes
}

#[test]
fn test_positions_are_one_based_lines_and_zero_based_columns() {
    let script = parse_script(SOURCE);
    assert_stmt(&script)
        .statement(0, |function| {
            function.kind("FunctionDecl").at(2, 0).child(0, |body| {
                body.kind("Compound").statement(0, |ret| {
                    ret.kind("Return").at(3, 2);
                });
            });
        })
        .statement(1, |first| {
            first.kind("ExpressionStatement").at(1, 0);
        })
        .statement(2, |closure| {
            closure.expression(|assignment| {
                assignment.at(5, 0).child(1, |value| {
                    value.kind("AnonymousFunction").at(5, 4);
                });
            });
        });
}

#[test]
fn test_every_node_is_linked_to_the_node_listing_it() {
    let script = parse_script(SOURCE);
    let root = NodeRef::Statement(&script);
    assert_eq!(root.info().parent(), None);

    for node in all_nodes(root) {
        for child in node.children() {
            assert_eq!(
                child.info().parent(),
                Some(node.id()),
                "{} under {}",
                child.node_type(),
                node.node_type()
            );
        }
    }
}

#[test]
fn test_ids_are_unique_and_children_come_first() {
    let script = parse_script(SOURCE);
    let nodes = all_nodes(NodeRef::Statement(&script));
    let ids: HashSet<_> = nodes.iter().map(|node| node.id()).collect();
    assert_eq!(ids.len(), nodes.len());

    for node in &nodes {
        for child in node.children() {
            assert!(child.id() < node.id(), "{} built before its children", node.node_type());
        }
    }
}

#[test]
fn test_lookup_by_id_and_offset() {
    let script = parse_script(SOURCE);
    let root = NodeRef::Statement(&script);

    let offset = SOURCE.find("a + 1").unwrap();
    let operand = node_at_offset(root, offset).unwrap();
    assert_eq!(operand.node_type(), "Identifier");
    assert_eq!(operand.info().token(), "a");
    assert_eq!((operand.info().line(), operand.info().column()), (3, 9));

    let found = find_by_id(root, operand.id()).unwrap();
    assert_eq!(found.info().span(), operand.info().span());
    assert!(node_at_offset(root, SOURCE.len() + 10).is_none());
}

#[test]
fn test_parent_index_walks_upwards() {
    let script = parse_script(SOURCE);
    let root = NodeRef::Statement(&script);
    let index = ParentIndex::build(root);
    assert_eq!(index.len(), all_nodes(root).len());

    let operand = node_at_offset(root, SOURCE.find("a + 1").unwrap()).unwrap();
    let kinds: Vec<_> = index.ancestors(operand).iter().map(|node| node.node_type()).collect();
    assert_eq!(kinds, vec!["Binary", "Return", "Compound", "FunctionDecl", "Compound"]);

    let function = index.enclosing_function(operand).unwrap();
    assert_eq!(function.as_statement().and_then(|s| s.as_function()).unwrap().name, "f");

    // closures count as enclosing functions too
    let parameter_use = node_at_offset(root, SOURCE.find("b; }").unwrap()).unwrap();
    let closure = index.enclosing_function(parameter_use).unwrap();
    assert_eq!(closure.as_statement().and_then(|s| s.as_function()).unwrap().name, "");
    assert_eq!(index.parent(closure).unwrap().node_type(), "AnonymousFunction");

    assert!(index.enclosing_function(root).is_none());
}

#[test]
fn test_snapshot_mirrors_the_tree() {
    let script = parse_script(SOURCE);
    let snapshot = snapshot_statement(&script);
    assert_eq!(snapshot.node_count(), all_nodes(NodeRef::Statement(&script)).len());
    assert_eq!(snapshot.children[0].node_type, "FunctionDecl");
    assert_eq!(snapshot.children[0].line, 2);

    let json = snapshot.to_json().unwrap();
    assert!(json.contains("\"node_type\": \"AnonymousFunction\""));
    assert!(json.contains("\"style\": \"function\""));
}
