use chrono::{NaiveDate, Utc};
use licita::workflows::tenders::{
    is_ready, FinancialCeiling, JsonFileStore, ListKind, SqliteTenderStore, TenderDesk,
    TenderDraft, TenderStatus, TenderStore,
};
use std::sync::Arc;

fn draft(edital: &str, opening: (i32, u32, u32)) -> TenderDraft {
    TenderDraft {
        empresa: "Empresa XYZ S.A.".to_string(),
        orgao_licitante: "Governo do Estado de Minas Gerais".to_string(),
        numero_edital: edital.to_string(),
        portal: "Portal Nacional".to_string(),
        categoria: "Serviços".to_string(),
        data_abertura: NaiveDate::from_ymd_opt(opening.0, opening.1, opening.2),
        ceiling: Some(FinancialCeiling::Valor {
            valor_minimo: 48_500.75,
        }),
        ..TenderDraft::default()
    }
}

fn exercise<S: TenderStore + 'static>(desk: &TenderDesk<S>) {
    let first = desk
        .register(draft("PE 101/2025", (2025, 4, 3)), Utc::now())
        .expect("first registration");
    let second = desk
        .register(draft("CC 7/2025", (2025, 4, 8)), Utc::now())
        .expect("second registration");

    let finalized = desk
        .finalize_dispute(
            &first.id,
            NaiveDate::from_ymd_opt(2025, 4, 3).expect("valid date"),
        )
        .expect("dispute open");
    assert_eq!(finalized.status_atual, TenderStatus::Habilitacao);

    desk.add_lot(&second.id).expect("lot added");
    desk.add_list_option(ListKind::Categorias, "Saúde")
        .expect("option added");
}

#[test]
fn json_file_store_survives_reopen() {
    let dir = tempfile::tempdir().expect("temp dir");

    let store = Arc::new(JsonFileStore::open(dir.path()).expect("store opens"));
    let desk = TenderDesk::open(store).expect("desk opens");
    exercise(&desk);
    let before = desk.tenders().expect("state readable");

    let reopened = TenderDesk::open(Arc::new(
        JsonFileStore::open(dir.path()).expect("store reopens"),
    ))
    .expect("desk reopens");

    assert_eq!(reopened.tenders().expect("state readable"), before);
    assert!(reopened
        .lists()
        .expect("lists readable")
        .categorias
        .contains(&"Saúde".to_string()));
}

#[test]
fn sqlite_store_survives_reopen() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("nested").join("licitacoes.db");

    let desk = TenderDesk::open(Arc::new(
        SqliteTenderStore::open(&path).expect("store opens"),
    ))
    .expect("desk opens");
    exercise(&desk);
    let before = desk.tenders().expect("state readable");

    let reopened = TenderDesk::open(Arc::new(
        SqliteTenderStore::open(&path).expect("store reopens"),
    ))
    .expect("desk reopens");

    assert_eq!(reopened.tenders().expect("state readable"), before);
    assert_eq!(
        reopened.lists().expect("lists readable"),
        desk.lists().expect("lists readable")
    );
}

#[test]
fn local_store_reads_browser_export() {
    let dir = tempfile::tempdir().expect("temp dir");
    std::fs::write(
        dir.path().join("qa_tenders.json"),
        r#"[{
            "id": "lq8z3k1x2",
            "createdAt": "2024-11-05T18:22:10.512Z",
            "empresa": "Construtora ABC Ltda",
            "orgaoLicitante": "Prefeitura de Santos",
            "numeroEdital": "PE 33/2024",
            "dataAbertura": "2024-11-20",
            "horarioSessao": "10:00",
            "prazoImpugnacao": "2024-11-15",
            "prazoEsclarecimento": "",
            "valorReferencia": 98000,
            "tipoLicitacao": "Valor",
            "valorMinimo": 85000,
            "percentualDesconto": 0,
            "statusAtual": "Aguardando Disputa",
            "faseAtual": "Lances",
            "posicaoAtual": "N/A",
            "tipoLote": "Multiplos",
            "lotes": [{"id": "x1y2z", "numero": "01", "colocacao": "2º Lugar"}],
            "dataLimiteRecurso": "",
            "horaLimiteRecurso": "",
            "contraProposta": false,
            "contraHabilitacao": false,
            "observacoes": "",
            "observacoesPregao": ""
        }, {
            "id": "lq8z9m4p0",
            "createdAt": "2024-11-06T09:02:44.100Z",
            "numeroEdital": "CC 4/2024",
            "valorReferencia": null,
            "tipoLicitacao": "Desconto",
            "valorMinimo": null,
            "percentualDesconto": null,
            "statusAtual": "Triagem"
        }]"#,
    )
    .expect("seed export");

    let store = JsonFileStore::open(dir.path()).expect("store opens");
    let tenders = store.load_tenders().expect("export parses");

    assert_eq!(tenders.len(), 2);
    let tender = &tenders[0];
    assert_eq!(tender.id.as_str(), "lq8z3k1x2");
    assert_eq!(tender.status_atual, TenderStatus::AguardandoDisputa);
    assert_eq!(tender.ceiling.amount(), 85_000.0);
    assert_eq!(tender.lotes[0].colocacao, "2º Lugar");
    assert!(tender.prazo_esclarecimento.is_none());

    let cleared = &tenders[1];
    assert_eq!(cleared.valor_referencia, 0.0);
    assert_eq!(
        cleared.ceiling,
        FinancialCeiling::Desconto {
            percentual_desconto: 0.0
        }
    );
    assert!(!is_ready(cleared));
}
