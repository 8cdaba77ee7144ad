#![allow(dead_code)]

use chrono::NaiveDate;
use rand::Rng;
use std::fs;
use std::io::Error;
use std::path::{Path, PathBuf};

pub const SCHEMA: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema" elementFormDefault="qualified">
  <xs:simpleType name="AmountType">
    <xs:restriction base="xs:decimal">
      <xs:totalDigits value="18"/>
      <xs:fractionDigits value="2"/>
    </xs:restriction>
  </xs:simpleType>
  <xs:simpleType name="DateType">
    <xs:restriction base="xs:string">
      <xs:pattern value="\d{2}\.\d{2}\.\d{4}"/>
    </xs:restriction>
  </xs:simpleType>
  <xs:complexType name="DocumentType">
    <xs:sequence>
      <xs:element name="DocRef" type="xs:string"/>
      <xs:element name="DocumentDate" type="DateType"/>
      <xs:element name="Payer" type="xs:string"/>
      <xs:element name="Amount" type="AmountType"/>
      <xs:element name="CurrCode" type="xs:string"/>
      <xs:element name="IP" type="xs:string"/>
      <xs:element name="CodeRev" type="xs:string"/>
      <xs:element name="PayTypeParam" type="xs:string"/>
      <xs:element name="PayGrndParam" type="xs:string"/>
    </xs:sequence>
  </xs:complexType>
  <xs:element name="BSMessage">
    <xs:complexType>
      <xs:sequence>
        <xs:element name="BSHead">
          <xs:complexType>
            <xs:sequence>
              <xs:element name="Sender" type="xs:string" minOccurs="0" maxOccurs="unbounded"/>
            </xs:sequence>
          </xs:complexType>
        </xs:element>
        <xs:element name="Documents">
          <xs:complexType>
            <xs:sequence>
              <xs:element name="Document" type="DocumentType" maxOccurs="unbounded"/>
            </xs:sequence>
          </xs:complexType>
        </xs:element>
      </xs:sequence>
      <xs:attribute name="ID" type="xs:string" use="required"/>
      <xs:attribute name="DateTime" type="xs:string"/>
    </xs:complexType>
  </xs:element>
</xs:schema>
"#;

/// Field values of one generated payment document.
#[derive(Debug, Clone)]
pub struct Payment {
    pub doc_ref: String,
    pub date: String,
    pub payer: String,
    pub amount: String,
    pub currency: String,
    pub ip: String,
    pub code_rev: String,
    pub pay_type: String,
    pub pay_ground: String,
}

impl Payment {
    /// A payment passing every rule on `date` against the built-in graph.
    pub fn valid(date: NaiveDate) -> Self {
        let mut rng = rand::thread_rng();
        Self {
            doc_ref: format!("DOC-{:016x}", rng.r#gen::<u64>()),
            date: date.format("%d.%m.%Y").to_string(),
            payer: "ООО Ромашка".to_string(),
            amount: format!("{}.{:02}", rng.gen_range(10..100_000), rng.gen_range(0..100)),
            currency: "810".to_string(),
            ip: format!("192.168.{}.{}", rng.gen_range(0..256), rng.gen_range(1..255)),
            code_rev: "18210102010011000110".to_string(),
            pay_type: "NS".to_string(),
            pay_ground: "TP".to_string(),
        }
    }

    pub fn to_xml(&self) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<BSMessage ID="{doc_ref}" DateTime="2024-01-01T00:00:00">
  <BSHead>
    <Sender>{payer}</Sender>
  </BSHead>
  <Documents>
    <Document>
      <DocRef>{doc_ref}</DocRef>
      <DocumentDate>{date}</DocumentDate>
      <Payer>{payer}</Payer>
      <Amount>{amount}</Amount>
      <CurrCode>{currency}</CurrCode>
      <IP>{ip}</IP>
      <CodeRev>{code_rev}</CodeRev>
      <PayTypeParam>{pay_type}</PayTypeParam>
      <PayGrndParam>{pay_ground}</PayGrndParam>
    </Document>
  </Documents>
</BSMessage>
"#,
            doc_ref = self.doc_ref,
            date = self.date,
            payer = self.payer,
            amount = self.amount,
            currency = self.currency,
            ip = self.ip,
            code_rev = self.code_rev,
            pay_type = self.pay_type,
            pay_ground = self.pay_ground,
        )
    }
}

pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

pub fn valid_payments(count: usize, date: NaiveDate) -> Vec<Payment> {
    (0..count).map(|_| Payment::valid(date)).collect()
}

pub fn document_path(dir: &Path, index: usize) -> PathBuf {
    dir.join(format!("payment_{index:02}.xml"))
}

/// Writes the schema and one file per payment, named in batch order.
pub fn write_batch(dir: &Path, payments: &[Payment]) -> Result<(), Error> {
    fs::write(dir.join("payments.xsd"), SCHEMA)?;
    for (index, payment) in payments.iter().enumerate() {
        fs::write(document_path(dir, index), payment.to_xml())?;
    }
    Ok(())
}

/// Merge artifacts currently in `dir`.
pub fn artifacts(dir: &Path) -> Vec<PathBuf> {
    let mut found: Vec<PathBuf> = fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|path| {
                    path.file_name()
                        .is_some_and(|name| name.to_string_lossy().starts_with("Total"))
                })
                .collect()
        })
        .unwrap_or_default();
    found.sort();
    found
}
