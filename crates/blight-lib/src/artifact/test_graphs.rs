//! Tiny ONNX graphs for exercising the tract adapter
//!
//! The weather graph takes a `(1, 5)` f32 batch. Output 0 is `ArgMax` over
//! the features as an i64 label; the optional output 1 is `Softmax` over the
//! same features, standing in for class probabilities.

use prost::Message;
use tract_onnx::pb::attribute_proto::AttributeType;
use tract_onnx::pb::tensor_proto::DataType;
use tract_onnx::pb::tensor_shape_proto::{dimension, Dimension};
use tract_onnx::pb::{
    type_proto, AttributeProto, GraphProto, ModelProto, NodeProto, OperatorSetIdProto,
    TensorShapeProto, TypeProto, ValueInfoProto,
};

const FEATURES: &str = "features";
const LABEL: &str = "label";
const PROBABILITIES: &str = "probabilities";

fn value_info(name: &str, elem_type: DataType, dims: &[i64]) -> ValueInfoProto {
    let dim = dims
        .iter()
        .map(|&d| Dimension {
            value: Some(dimension::Value::DimValue(d)),
            ..Default::default()
        })
        .collect();

    ValueInfoProto {
        name: name.to_string(),
        r#type: Some(TypeProto {
            value: Some(type_proto::Value::TensorType(type_proto::Tensor {
                elem_type: elem_type as i32,
                shape: Some(TensorShapeProto { dim }),
            })),
            ..Default::default()
        }),
        ..Default::default()
    }
}

fn int_attr(name: &str, value: i64) -> AttributeProto {
    AttributeProto {
        name: name.to_string(),
        r#type: AttributeType::Int as i32,
        i: value,
        ..Default::default()
    }
}

fn node(op_type: &str, output: &str, attribute: Vec<AttributeProto>) -> NodeProto {
    NodeProto {
        name: output.to_string(),
        op_type: op_type.to_string(),
        input: vec![FEATURES.to_string()],
        output: vec![output.to_string()],
        attribute,
        ..Default::default()
    }
}

/// Serialized weather model, with or without the probability output
pub(crate) fn weather_model(with_probabilities: bool) -> Vec<u8> {
    let mut nodes = vec![node(
        "ArgMax",
        LABEL,
        vec![int_attr("axis", 1), int_attr("keepdims", 0)],
    )];
    let mut outputs = vec![value_info(LABEL, DataType::Int64, &[1])];

    if with_probabilities {
        nodes.push(node("Softmax", PROBABILITIES, vec![int_attr("axis", 1)]));
        outputs.push(value_info(PROBABILITIES, DataType::Float, &[1, 5]));
    }

    let model = ModelProto {
        ir_version: 8,
        producer_name: "blight-lib-tests".to_string(),
        opset_import: vec![OperatorSetIdProto {
            domain: String::new(),
            version: 13,
        }],
        graph: Some(GraphProto {
            name: "weather".to_string(),
            node: nodes,
            input: vec![value_info(FEATURES, DataType::Float, &[1, 5])],
            output: outputs,
            ..Default::default()
        }),
        ..Default::default()
    };
    model.encode_to_vec()
}
