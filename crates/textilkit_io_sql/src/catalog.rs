//! Closed query catalog: report datasets plus the dashboard's ad-hoc aggregates.
//!
//! Every entry is a parameterless, read-only aggregate. New datasets are added by
//! extending [`L_QUERY_CATALOG`]; the extraction path stays the same.

use std::collections::BTreeSet;

use crate::spec::SourceError;

/// One catalog entry: name, fixed SQL and the column labels the result must carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecQuery {
    /// Dataset key (`snake_case`, becomes the sheet name).
    pub name: &'static str,
    /// Fixed SQL text.
    pub sql: &'static str,
    /// Expected result labels, in order.
    pub columns: &'static [&'static str],
}

////////////////////////////////////////////////////////////////////////////////
// #region ReportDatasets

/// Report datasets, in sheet order.
pub const L_QUERY_CATALOG: [SpecQuery; 11] = [
    SpecQuery {
        name: "vendas_por_produto",
        sql: "SELECT p.categoria AS `Categoria`, p.tamanho AS `Tamanho`, p.cor AS `Cor`, \
              COUNT(v.id) AS `Quantidade de Vendas`, \
              SUM(v.quantidade) AS `Unidades Vendidas`, \
              SUM(v.valor_total) AS `Valor Total (R$)` \
              FROM vendas v JOIN produtos p ON v.produto_id = p.id \
              GROUP BY p.categoria, p.tamanho, p.cor",
        columns: &[
            "Categoria",
            "Tamanho",
            "Cor",
            "Quantidade de Vendas",
            "Unidades Vendidas",
            "Valor Total (R$)",
        ],
    },
    SpecQuery {
        name: "producao_por_turno",
        sql: "SELECT turno AS `Turno`, COUNT(*) AS `Quantidade de Produções`, \
              SUM(quantidade_produzida) AS `Total Produzido (unidades)`, \
              AVG(tempo_producao_horas) AS `Tempo Médio (horas)`, \
              qualidade AS `Qualidade`, COUNT(*) AS `Número de Registros` \
              FROM producao GROUP BY turno, qualidade",
        columns: &[
            "Turno",
            "Quantidade de Produções",
            "Total Produzido (unidades)",
            "Tempo Médio (horas)",
            "Qualidade",
            "Número de Registros",
        ],
    },
    SpecQuery {
        name: "tecidos_mais_usados",
        sql: "SELECT t.tipo AS `Tipo de Tecido`, t.cor AS `Cor`, COUNT(cm.id) AS `Vezes Usado`, \
              SUM(cm.quantidade_usada) AS `Total Usado (metros)` \
              FROM consumo_materiais cm JOIN tecidos t ON cm.tecido_id = t.id \
              WHERE cm.tecido_id IS NOT NULL GROUP BY t.tipo, t.cor \
              ORDER BY SUM(cm.quantidade_usada) DESC",
        columns: &["Tipo de Tecido", "Cor", "Vezes Usado", "Total Usado (metros)"],
    },
    SpecQuery {
        name: "agulhas_mais_usadas",
        sql: "SELECT a.tipo AS `Tipo de Agulha`, a.tamanho AS `Tamanho`, \
              COUNT(cm.id) AS `Vezes Usado`, \
              SUM(cm.quantidade_usada) AS `Total de Agulhas (unidades)` \
              FROM consumo_materiais cm JOIN agulhas a ON cm.agulha_id = a.id \
              WHERE cm.agulha_id IS NOT NULL GROUP BY a.tipo, a.tamanho \
              ORDER BY COUNT(cm.id) DESC",
        columns: &[
            "Tipo de Agulha",
            "Tamanho",
            "Vezes Usado",
            "Total de Agulhas (unidades)",
        ],
    },
    SpecQuery {
        name: "linhas_mais_usadas",
        sql: "SELECT rl.tipo AS `Tipo de Linha`, rl.cor AS `Cor`, COUNT(cm.id) AS `Vezes Usado`, \
              SUM(cm.quantidade_usada) AS `Total Usado (metros)` \
              FROM consumo_materiais cm JOIN rolos_linha rl ON cm.rolo_linha_id = rl.id \
              WHERE cm.rolo_linha_id IS NOT NULL GROUP BY rl.tipo, rl.cor \
              ORDER BY SUM(cm.quantidade_usada) DESC",
        columns: &["Tipo de Linha", "Cor", "Vezes Usado", "Total Usado (metros)"],
    },
    SpecQuery {
        name: "manutencao_por_tipo",
        sql: "SELECT tipo_manutencao AS `Tipo de Manutenção`, COUNT(*) AS `Quantidade`, \
              SUM(custo) AS `Custo Total (R$)`, AVG(custo) AS `Custo Médio (R$)`, \
              SUM(tempo_parada_horas) AS `Tempo Parada Total (horas)`, \
              AVG(tempo_parada_horas) AS `Tempo Parada Médio (horas)` \
              FROM manutencao_maquinas GROUP BY tipo_manutencao",
        columns: &[
            "Tipo de Manutenção",
            "Quantidade",
            "Custo Total (R$)",
            "Custo Médio (R$)",
            "Tempo Parada Total (horas)",
            "Tempo Parada Médio (horas)",
        ],
    },
    SpecQuery {
        name: "producao_por_setor",
        sql: "SELECT f.setor AS `Setor`, COUNT(DISTINCT f.id) AS `Número de Funcionários`, \
              COUNT(p.id) AS `Quantidade de Produções`, \
              SUM(p.quantidade_produzida) AS `Total Produzido (unidades)` \
              FROM funcionarios f LEFT JOIN producao p ON p.operador = f.nome \
              GROUP BY f.setor",
        columns: &[
            "Setor",
            "Número de Funcionários",
            "Quantidade de Produções",
            "Total Produzido (unidades)",
        ],
    },
    SpecQuery {
        name: "vendas_por_forma_pagamento",
        sql: "SELECT forma_pagamento AS `Forma de Pagamento`, COUNT(*) AS `Quantidade de Vendas`, \
              SUM(valor_total) AS `Valor Total (R$)`, AVG(valor_total) AS `Ticket Médio (R$)` \
              FROM vendas GROUP BY forma_pagamento",
        columns: &[
            "Forma de Pagamento",
            "Quantidade de Vendas",
            "Valor Total (R$)",
            "Ticket Médio (R$)",
        ],
    },
    SpecQuery {
        name: "estoque_atual",
        sql: "SELECT 'Rolos de Linha' AS `Item`, COUNT(*) AS `Quantidade de Itens`, \
              SUM(quantidade_estoque) AS `Estoque Total (unidades)` FROM rolos_linha \
              UNION ALL \
              SELECT 'Agulhas', COUNT(*), SUM(quantidade_estoque) FROM agulhas \
              UNION ALL \
              SELECT 'Tecidos', COUNT(*), SUM(metragem_estoque) FROM tecidos",
        columns: &["Item", "Quantidade de Itens", "Estoque Total (unidades)"],
    },
    SpecQuery {
        name: "top_clientes",
        sql: "SELECT c.nome AS `Nome do Cliente`, c.cidade AS `Cidade`, c.estado AS `Estado`, \
              COUNT(v.id) AS `Número de Compras`, \
              SUM(v.valor_total) AS `Valor Total Comprado (R$)` \
              FROM clientes c JOIN vendas v ON c.id = v.cliente_id \
              GROUP BY c.id, c.nome, c.cidade, c.estado \
              ORDER BY SUM(v.valor_total) DESC LIMIT 20",
        columns: &[
            "Nome do Cliente",
            "Cidade",
            "Estado",
            "Número de Compras",
            "Valor Total Comprado (R$)",
        ],
    },
    SpecQuery {
        name: "vendas_por_estado",
        sql: "SELECT c.estado AS `Estado`, COUNT(DISTINCT c.id) AS `Número de Clientes`, \
              COUNT(v.id) AS `Quantidade de Vendas`, SUM(v.valor_total) AS `Valor Total (R$)` \
              FROM vendas v JOIN clientes c ON v.cliente_id = c.id \
              GROUP BY c.estado ORDER BY SUM(v.valor_total) DESC",
        columns: &[
            "Estado",
            "Número de Clientes",
            "Quantidade de Vendas",
            "Valor Total (R$)",
        ],
    },
];

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region DashboardQueries

const L_COLUMNS_TOTAL: &[&str] = &["total"];

/// Number of sales.
pub const Q_TOTAL_VENDAS: SpecQuery = SpecQuery {
    name: "total_vendas",
    sql: "SELECT COUNT(*) AS total FROM vendas",
    columns: L_COLUMNS_TOTAL,
};
/// Number of production records.
pub const Q_TOTAL_PRODUCOES: SpecQuery = SpecQuery {
    name: "total_producoes",
    sql: "SELECT COUNT(*) AS total FROM producao",
    columns: L_COLUMNS_TOTAL,
};
/// Number of customers.
pub const Q_TOTAL_CLIENTES: SpecQuery = SpecQuery {
    name: "total_clientes",
    sql: "SELECT COUNT(*) AS total FROM clientes",
    columns: L_COLUMNS_TOTAL,
};
/// Number of employees.
pub const Q_TOTAL_FUNCIONARIOS: SpecQuery = SpecQuery {
    name: "total_funcionarios",
    sql: "SELECT COUNT(*) AS total FROM funcionarios",
    columns: L_COLUMNS_TOTAL,
};
/// Number of suppliers.
pub const Q_TOTAL_FORNECEDORES: SpecQuery = SpecQuery {
    name: "total_fornecedores",
    sql: "SELECT COUNT(*) AS total FROM fornecedores",
    columns: L_COLUMNS_TOTAL,
};
/// Sum of sale values.
pub const Q_VALOR_VENDAS: SpecQuery = SpecQuery {
    name: "valor_vendas",
    sql: "SELECT SUM(valor_total) AS total FROM vendas",
    columns: L_COLUMNS_TOTAL,
};
/// Sum of maintenance costs.
pub const Q_CUSTO_MANUTENCAO: SpecQuery = SpecQuery {
    name: "custo_manutencao",
    sql: "SELECT SUM(custo) AS total FROM manutencao_maquinas",
    columns: L_COLUMNS_TOTAL,
};

/// Top-3 customers by sale value.
pub const Q_TOP3_CLIENTES: SpecQuery = SpecQuery {
    name: "top3_clientes",
    sql: "SELECT c.nome, SUM(v.valor_total) AS valor_total \
          FROM clientes c JOIN vendas v ON c.id = v.cliente_id \
          GROUP BY c.id, c.nome ORDER BY valor_total DESC LIMIT 3",
    columns: &["nome", "valor_total"],
};
/// Top-3 payment methods by sale value.
pub const Q_TOP3_PAGAMENTOS: SpecQuery = SpecQuery {
    name: "top3_pagamentos",
    sql: "SELECT forma_pagamento, COUNT(*) AS quantidade, SUM(valor_total) AS valor_total \
          FROM vendas GROUP BY forma_pagamento ORDER BY valor_total DESC LIMIT 3",
    columns: &["forma_pagamento", "quantidade", "valor_total"],
};
/// Top-3 shifts by units produced. Also feeds the shifts chart.
pub const Q_TOP3_TURNOS: SpecQuery = SpecQuery {
    name: "top3_turnos",
    sql: "SELECT turno, COUNT(*) AS quantidade, SUM(quantidade_produzida) AS total_produzido \
          FROM producao GROUP BY turno ORDER BY total_produzido DESC LIMIT 3",
    columns: &["turno", "quantidade", "total_produzido"],
};
/// Costliest maintenance type.
pub const Q_MANUTENCAO_CARA: SpecQuery = SpecQuery {
    name: "manutencao_cara",
    sql: "SELECT tipo_manutencao, SUM(custo) AS custo_total, \
          SUM(tempo_parada_horas) AS tempo_total_horas \
          FROM manutencao_maquinas GROUP BY tipo_manutencao \
          ORDER BY custo_total DESC LIMIT 1",
    columns: &["tipo_manutencao", "custo_total", "tempo_total_horas"],
};
/// Top-5 customers by sale value, chart source.
pub const Q_TOP5_CLIENTES: SpecQuery = SpecQuery {
    name: "top5_clientes",
    sql: "SELECT c.nome, SUM(v.valor_total) AS valor_total \
          FROM clientes c JOIN vendas v ON c.id = v.cliente_id \
          GROUP BY c.id, c.nome ORDER BY valor_total DESC LIMIT 5",
    columns: &["nome", "valor_total"],
};
/// Top-5 payment methods by sale value, chart source.
pub const Q_TOP5_PAGAMENTOS: SpecQuery = SpecQuery {
    name: "top5_pagamentos",
    sql: "SELECT forma_pagamento, SUM(valor_total) AS valor_total \
          FROM vendas GROUP BY forma_pagamento ORDER BY valor_total DESC LIMIT 5",
    columns: &["forma_pagamento", "valor_total"],
};

/// Every dashboard query.
pub const L_DASHBOARD_QUERIES: [SpecQuery; 13] = [
    Q_TOTAL_VENDAS,
    Q_TOTAL_PRODUCOES,
    Q_TOTAL_CLIENTES,
    Q_TOTAL_FUNCIONARIOS,
    Q_TOTAL_FORNECEDORES,
    Q_VALOR_VENDAS,
    Q_CUSTO_MANUTENCAO,
    Q_TOP3_CLIENTES,
    Q_TOP3_PAGAMENTOS,
    Q_TOP3_TURNOS,
    Q_MANUTENCAO_CARA,
    Q_TOP5_CLIENTES,
    Q_TOP5_PAGAMENTOS,
];

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Validation

/// Check a catalog before anything runs.
///
/// Names must be unique non-empty `snake_case` keys, SQL must be a single
/// read-only `SELECT`, labels must be present and unique per entry.
pub fn validate_catalog(catalog: &[SpecQuery]) -> Result<(), SourceError> {
    let mut set_names = BTreeSet::new();
    for query in catalog {
        validate_query(query)?;
        if !set_names.insert(query.name) {
            return Err(SourceError::InvalidCatalog(format!(
                "duplicate entry name: {}",
                query.name
            )));
        }
    }
    Ok(())
}

fn validate_query(query: &SpecQuery) -> Result<(), SourceError> {
    let if_name_ok = !query.name.is_empty()
        && query
            .name
            .chars()
            .all(|chr| chr.is_ascii_lowercase() || chr.is_ascii_digit() || chr == '_');
    if !if_name_ok {
        return Err(SourceError::InvalidCatalog(format!(
            "entry name must be snake_case: {:?}",
            query.name
        )));
    }

    let c_sql = query.sql.trim();
    if !c_sql.to_ascii_uppercase().starts_with("SELECT") || c_sql.contains(';') {
        return Err(SourceError::InvalidCatalog(format!(
            "{}: SQL must be a single SELECT statement",
            query.name
        )));
    }

    if query.columns.is_empty() {
        return Err(SourceError::InvalidCatalog(format!(
            "{}: no expected columns",
            query.name
        )));
    }
    let set_columns: BTreeSet<_> = query.columns.iter().collect();
    if set_columns.len() != query.columns.len() {
        return Err(SourceError::InvalidCatalog(format!(
            "{}: duplicate expected columns",
            query.name
        )));
    }
    Ok(())
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalogs_are_valid() {
        validate_catalog(&L_QUERY_CATALOG).expect("report catalog");
        validate_catalog(&L_DASHBOARD_QUERIES).expect("dashboard catalog");
    }

    #[test]
    fn test_catalog_keeps_sheet_order() {
        let l_names: Vec<_> = L_QUERY_CATALOG.iter().map(|query| query.name).collect();
        assert_eq!(l_names.first(), Some(&"vendas_por_produto"));
        assert_eq!(l_names[9], "top_clientes");
        assert_eq!(l_names.len(), 11);
    }

    #[test]
    fn test_validate_catalog_rejects_bad_entries() {
        let query = SpecQuery {
            name: "ok",
            sql: "SELECT 1 AS a",
            columns: &["a"],
        };

        let err = validate_catalog(&[query, query]).expect_err("duplicate");
        assert!(err.to_string().contains("duplicate entry name"));

        let write = SpecQuery {
            sql: "DELETE FROM vendas",
            ..query
        };
        assert!(validate_catalog(&[write]).is_err());

        let chained = SpecQuery {
            sql: "SELECT 1 AS a; DROP TABLE vendas",
            ..query
        };
        assert!(validate_catalog(&[chained]).is_err());

        let bad_name = SpecQuery {
            name: "Top Clientes",
            ..query
        };
        assert!(validate_catalog(&[bad_name]).is_err());

        let dup_cols = SpecQuery {
            columns: &["a", "a"],
            ..query
        };
        assert!(validate_catalog(&[dup_cols]).is_err());
    }
}
