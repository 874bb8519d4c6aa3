use sea_orm::entity::prelude::*;
use serde_json::json;

use crate::diff::FieldMap;

/// SeaORM entity for the samples table
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "samples")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub job_code: String,
    pub name: String,
    pub matrix: String,
    pub temperature: Option<f64>,
    pub condition: Option<String>,
    pub received_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::sample_test::Entity")]
    SampleTest,
}

impl Related<super::sample_test::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SampleTest.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Project the row into a field map for audit diffing.
    pub fn field_map(&self) -> FieldMap {
        let mut fields = FieldMap::new();
        fields.insert("id".to_string(), json!(self.id));
        fields.insert("job_code".to_string(), json!(self.job_code));
        fields.insert("name".to_string(), json!(self.name));
        fields.insert("matrix".to_string(), json!(self.matrix));
        fields.insert("temperature".to_string(), json!(self.temperature));
        fields.insert("condition".to_string(), json!(self.condition));
        fields.insert("received_at".to_string(), json!(self.received_at));
        fields.insert("created_at".to_string(), json!(self.created_at));
        fields.insert("updated_at".to_string(), json!(self.updated_at));
        fields
    }
}
