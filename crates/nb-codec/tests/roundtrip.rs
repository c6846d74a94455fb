//! Round trips through the nbformat codec

use nb_codec::{decode, encode, CodecError, CodecOptions, NotebookCodec};
use nb_model::{
    Cell, CellType, MimeBundle, MimeEntry, MimePayload, NotebookDocument, OutputVariant,
};
use nb_test_utils::strategies::arb_document;
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use serde_json::Value;

const JUPYTER_NOTEBOOK: &str = r##"{
 "cells": [
  {
   "cell_type": "markdown",
   "metadata": {},
   "source": [
    "# Analysis\n",
    "Some *prose*."
   ]
  },
  {
   "cell_type": "code",
   "execution_count": 3,
   "metadata": {
    "scrolled": true
   },
   "outputs": [
    {
     "name": "stdout",
     "output_type": "stream",
     "text": [
      "hello\n"
     ]
    },
    {
     "data": {
      "text/plain": [
       "42"
      ],
      "text/html": [
       "<b>42</b>"
      ]
     },
     "execution_count": 3,
     "metadata": {},
     "output_type": "execute_result"
    },
    {
     "data": {
      "image/png": "iVBORw0KGgo=",
      "text/plain": [
       "<Figure>"
      ]
     },
     "metadata": {
      "needs_background": "light"
     },
     "output_type": "display_data"
    },
    {
     "ename": "ZeroDivisionError",
     "evalue": "division by zero",
     "output_type": "error",
     "traceback": [
      "Traceback (most recent call last)",
      "ZeroDivisionError: division by zero"
     ]
    }
   ],
   "source": [
    "print('hello')\n",
    "42"
   ]
  },
  {
   "cell_type": "raw",
   "metadata": {},
   "source": []
  }
 ],
 "metadata": {
  "kernelspec": {
   "display_name": "Python 3",
   "language": "python",
   "name": "python3"
  },
  "language_info": {
   "name": "python"
  }
 },
 "nbformat": 4,
 "nbformat_minor": 2
}
"##;

#[test]
fn jupyter_file_is_reproduced_byte_for_byte() {
    let doc = decode(JUPYTER_NOTEBOOK).unwrap();

    assert_eq!(doc.len(), 3);
    assert_eq!(doc.cells()[1].execution_count(), Some(3));
    assert_eq!(doc.cells()[1].outputs().len(), 4);

    assert_eq!(encode(&doc).unwrap(), JUPYTER_NOTEBOOK);
}

#[test]
fn output_variants_decode_with_payload_kinds() {
    let doc = decode(JUPYTER_NOTEBOOK).unwrap();
    let outputs = doc.cells()[1].outputs();

    let OutputVariant::ExecuteResult { data, .. } = &outputs[1] else {
        panic!("expected execute_result, got {:?}", outputs[1]);
    };
    assert_eq!(data.mime_types().collect::<Vec<_>>(), vec!["text/plain", "text/html"]);

    let OutputVariant::DisplayData { data, metadata } = &outputs[2] else {
        panic!("expected display_data, got {:?}", outputs[2]);
    };
    assert_eq!(
        data.get("image/png").map(MimeEntry::payload),
        Some(&MimePayload::Binary(vec![0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a]))
    );
    assert_eq!(metadata["needs_background"], "light");

    assert!(outputs[3].is_error());
}

#[test]
fn whitespace_free_input_reencodes_with_canonical_layout() {
    let compact = r#"{"nbformat":4,"nbformat_minor":5,"metadata":{},"cells":[
        {"id":"a1","cell_type":"markdown","source":"line one\nline two","metadata":{}}]}"#;

    let doc = decode(compact).unwrap();
    let value: Value = serde_json::from_str(&encode(&doc).unwrap()).unwrap();

    assert_eq!(value["cells"][0]["id"], "a1");
    assert_eq!(
        value["cells"][0]["source"],
        serde_json::json!(["line one\n", "line two"])
    );
    assert!(value["cells"][0].get("outputs").is_none());
    assert_eq!(doc.format().to_string(), "4.5");
}

#[test]
fn recovery_skips_bad_cells_and_reports_them() {
    let json = r#"{"nbformat":4,"nbformat_minor":4,"metadata":{},"cells":[
        {"cell_type":"code","source":"ok()","outputs":[
            {"output_type":"stream","name":"stdout","text":"fine"},
            {"output_type":"stream","name":"stdin","text":"bad"}
        ]},
        {"cell_type":"code","source":42},
        {"cell_type":"markdown","source":"kept"}
    ]}"#;

    let decoded = NotebookCodec::new().decode(json).unwrap();

    assert_eq!(decoded.document.len(), 2);
    assert_eq!(decoded.document.cells()[1].cell_type(), CellType::Markdown);
    assert_eq!(decoded.document.cells()[0].outputs().len(), 1);
    assert_eq!(decoded.report.skipped_cells.len(), 1);
    assert_eq!(decoded.report.skipped_cells[0].path, "cells[1].source");
    assert_eq!(decoded.report.skipped_outputs[0].path, "cells[0].outputs[1].name");
    assert!(!decoded.report.is_clean());

    let strict = NotebookCodec::with_options(CodecOptions::strict());
    let err = strict.decode(json).unwrap_err();
    assert!(err.is_malformed());
}

#[test]
fn mismatched_payload_kinds_survive_a_round_trip() {
    let bundle = MimeBundle::new()
        .with(MimeEntry::new("text/plain", MimePayload::Binary(vec![1, 2, 3])))
        .with(MimeEntry::new("image/png", MimePayload::text("AAAA")))
        .with(MimeEntry::new("image/jpeg", MimePayload::text("not base64!")));
    let mut cell = Cell::code("plot()");
    cell.push_output(OutputVariant::display(bundle)).unwrap();
    let doc = NotebookDocument::from_cells(vec![cell]);

    let back = decode(&encode(&doc).unwrap()).unwrap();

    assert_eq!(back, doc);
    let data = back.cells()[0].outputs()[0].data().unwrap();
    assert_eq!(data.plain_text().as_deref(), Some("AQID"));
    assert_eq!(
        data.get("image/png").map(MimeEntry::payload),
        Some(&MimePayload::Binary(vec![0, 0, 0]))
    );
}

#[test]
fn non_v4_documents_are_rejected() {
    let err = decode(r#"{"nbformat":3,"nbformat_minor":0,"worksheets":[]}"#).unwrap_err();
    assert!(matches!(err, CodecError::MalformedDocument { .. }));
    assert!(matches!(decode("not json"), Err(CodecError::Json(_))));
}

#[test]
fn file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("analysis.ipynb");
    let codec = NotebookCodec::new();

    let doc = decode(JUPYTER_NOTEBOOK).unwrap();
    codec.write(&path, &doc).unwrap();
    let read = codec.read(&path).unwrap();

    assert_eq!(read.document, doc);
    assert!(read.report.is_clean());
    assert_eq!(std::fs::read_to_string(&path).unwrap(), JUPYTER_NOTEBOOK);
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = NotebookCodec::new()
        .read(dir.path().join("absent.ipynb"))
        .unwrap_err();
    assert!(matches!(err, CodecError::Io { .. }));
}

proptest! {
    #[test]
    fn encode_then_decode_is_identity(doc in arb_document()) {
        let json = encode(&doc).unwrap();
        let back = decode(&json).unwrap();
        prop_assert_eq!(back, doc);
    }

    #[test]
    fn encoding_is_stable(doc in arb_document(), indent in 0usize..4) {
        let codec = NotebookCodec::with_options(CodecOptions::default().with_indent(indent));
        let once = codec.encode(&doc).unwrap();
        let twice = codec.encode(&codec.decode(&once).unwrap().document).unwrap();
        prop_assert_eq!(once, twice);
    }
}
