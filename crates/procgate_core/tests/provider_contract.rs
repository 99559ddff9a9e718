use procgate_core::{
    DataProvider, Entity, EntityCreateRequest, EntityGateway, GatewayError, OutputRow,
    ParamBinding, ProcRow, ProviderError, ProviderResult, SqlValue, CREATE_PROCEDURE,
    GET_ALL_PROCEDURE, GET_BY_ID_PROCEDURE,
};
use std::cell::RefCell;
use std::rc::Rc;

/// Provider double that replays canned outputs and rows while recording
/// every call it receives.
#[derive(Default)]
struct ScriptedProvider {
    outputs: Vec<(String, SqlValue)>,
    rows: Vec<Vec<SqlValue>>,
    calls: Rc<RefCell<Vec<RecordedCall>>>,
}

#[derive(Debug)]
struct RecordedCall {
    procedure: String,
    inputs: Vec<(String, SqlValue)>,
    declared_outputs: Vec<String>,
}

impl ScriptedProvider {
    fn with_outputs(outputs: Vec<(String, SqlValue)>) -> Self {
        Self {
            outputs,
            ..Self::default()
        }
    }

    fn with_rows(rows: Vec<Vec<SqlValue>>) -> Self {
        Self {
            rows,
            ..Self::default()
        }
    }

    fn call_log(&self) -> Rc<RefCell<Vec<RecordedCall>>> {
        Rc::clone(&self.calls)
    }

    fn record(&self, procedure: &str, binding: &ParamBinding) {
        self.calls.borrow_mut().push(RecordedCall {
            procedure: procedure.to_string(),
            inputs: binding.inputs().to_vec(),
            declared_outputs: binding.declared_outputs().to_vec(),
        });
    }
}

impl DataProvider for ScriptedProvider {
    fn execute_non_query<B, O>(
        &self,
        procedure: &str,
        bind: B,
        read_output: O,
    ) -> ProviderResult<()>
    where
        B: FnOnce(&mut ParamBinding),
        O: FnOnce(&OutputRow) -> ProviderResult<()>,
    {
        let mut binding = ParamBinding::default();
        bind(&mut binding);
        self.record(procedure, &binding);

        for parameter in binding.declared_outputs() {
            if !self.outputs.iter().any(|(name, _)| name == parameter) {
                return Err(ProviderError::MissingOutput {
                    procedure: procedure.to_string(),
                    parameter: parameter.clone(),
                });
            }
        }
        read_output(&OutputRow::new(procedure, self.outputs.clone()))
    }

    fn execute_query<B, M>(&self, procedure: &str, bind: B, mut map_row: M) -> ProviderResult<()>
    where
        B: FnOnce(&mut ParamBinding),
        M: FnMut(&ProcRow) -> ProviderResult<()>,
    {
        let mut binding = ParamBinding::default();
        bind(&mut binding);
        self.record(procedure, &binding);

        for row in &self.rows {
            map_row(&ProcRow::new(row.clone()))?;
        }
        Ok(())
    }
}

#[test]
fn create_binds_payload_fields_and_declares_id_output() {
    let provider = ScriptedProvider::with_outputs(vec![("id".to_string(), SqlValue::Integer(41))]);
    let calls = provider.call_log();
    let gateway = EntityGateway::new(provider);

    let id = gateway.create(&EntityCreateRequest::new(9, "bound")).unwrap();
    assert_eq!(id, 41);

    let recorded = calls.borrow();
    assert_eq!(recorded.len(), 1);
    assert_eq!(recorded[0].procedure, CREATE_PROCEDURE);
    assert_eq!(
        recorded[0].inputs,
        vec![
            ("stuff".to_string(), SqlValue::Text("bound".to_string())),
            ("thing".to_string(), SqlValue::Integer(9)),
        ]
    );
    assert_eq!(recorded[0].declared_outputs, vec!["id".to_string()]);
}

#[test]
fn get_all_maps_columns_in_list_order() {
    let provider = ScriptedProvider::with_rows(vec![vec![
        SqlValue::Integer(1),
        SqlValue::Integer(100),
        SqlValue::Integer(200),
        SqlValue::Integer(7),
        SqlValue::Text("seven".to_string()),
    ]]);
    let gateway = EntityGateway::new(provider);

    let entities = gateway.get_all().unwrap();
    assert_eq!(
        entities,
        vec![Entity {
            id: 1,
            date_created: 100,
            date_modified: 200,
            thing: 7,
            stuff: "seven".to_string(),
        }]
    );
}

#[test]
fn get_by_id_maps_swapped_trailing_columns() {
    // Key lookup projects text before integer in the trailing pair.
    let provider = ScriptedProvider::with_rows(vec![vec![
        SqlValue::Integer(1),
        SqlValue::Integer(100),
        SqlValue::Integer(200),
        SqlValue::Text("seven".to_string()),
        SqlValue::Integer(7),
    ]]);
    let gateway = EntityGateway::new(provider);

    let entity = gateway.get_by_id(1).unwrap().unwrap();
    assert_eq!(entity.stuff, "seven");
    assert_eq!(entity.thing, 7);
}

#[test]
fn get_by_id_binds_the_key_and_maps_absence_to_none() {
    let provider = ScriptedProvider::default();
    let calls = provider.call_log();
    let gateway = EntityGateway::new(provider);

    let found = gateway.get_by_id(77).unwrap();
    assert!(found.is_none());

    let recorded = calls.borrow();
    assert_eq!(recorded[0].procedure, GET_BY_ID_PROCEDURE);
    assert_eq!(
        recorded[0].inputs,
        vec![("id".to_string(), SqlValue::Integer(77))]
    );
    assert!(recorded[0].declared_outputs.is_empty());
}

#[test]
fn get_all_passes_no_parameters_and_yields_empty_list_without_rows() {
    let provider = ScriptedProvider::default();
    let calls = provider.call_log();
    let gateway = EntityGateway::new(provider);

    let entities = gateway.get_all().unwrap();
    assert!(entities.is_empty());

    let recorded = calls.borrow();
    assert_eq!(recorded[0].procedure, GET_ALL_PROCEDURE);
    assert!(recorded[0].inputs.is_empty());
}

#[test]
fn create_rejects_non_integer_id_output_regardless_of_backend() {
    let provider =
        ScriptedProvider::with_outputs(vec![("id".to_string(), SqlValue::Text("41".to_string()))]);
    let gateway = EntityGateway::new(provider);

    let err = gateway
        .create(&EntityCreateRequest::new(1, "typed"))
        .unwrap_err();
    match err {
        GatewayError::Provider(ProviderError::ValueType {
            expected, actual, ..
        }) => {
            assert_eq!(expected, "integer");
            assert_eq!(actual, "text");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn create_rejects_zero_as_generated_key() {
    let provider = ScriptedProvider::with_outputs(vec![("id".to_string(), SqlValue::Integer(0))]);
    let gateway = EntityGateway::new(provider);

    let err = gateway
        .create(&EntityCreateRequest::new(1, "zeroed"))
        .unwrap_err();
    assert!(matches!(err, GatewayError::InvalidGeneratedId(0)));
}

#[test]
fn row_type_mismatch_aborts_get_all() {
    let provider = ScriptedProvider::with_rows(vec![
        vec![
            SqlValue::Integer(1),
            SqlValue::Integer(100),
            SqlValue::Integer(200),
            SqlValue::Integer(7),
            SqlValue::Text("good".to_string()),
        ],
        vec![
            SqlValue::Integer(2),
            SqlValue::Integer(100),
            SqlValue::Integer(200),
            SqlValue::Text("not an integer".to_string()),
            SqlValue::Text("bad".to_string()),
        ],
    ]);
    let gateway = EntityGateway::new(provider);

    let err = gateway.get_all().unwrap_err();
    assert!(matches!(
        err,
        GatewayError::Provider(ProviderError::ValueType { .. })
    ));
}

#[test]
fn key_lookup_with_several_rows_keeps_the_first() {
    let provider = ScriptedProvider::with_rows(vec![
        vec![
            SqlValue::Integer(1),
            SqlValue::Integer(100),
            SqlValue::Integer(200),
            SqlValue::Text("first".to_string()),
            SqlValue::Integer(1),
        ],
        vec![
            SqlValue::Integer(1),
            SqlValue::Integer(300),
            SqlValue::Integer(400),
            SqlValue::Text("second".to_string()),
            SqlValue::Integer(2),
        ],
    ]);
    let gateway = EntityGateway::new(provider);

    let entity = gateway.get_by_id(1).unwrap().unwrap();
    assert_eq!(entity.stuff, "first");
    assert_eq!(entity.date_created, 100);
}
