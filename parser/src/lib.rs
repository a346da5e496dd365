pub mod model;

use nom::branch::alt;
use nom::bytes::complete::tag;
use nom::character::complete::{alpha1, digit1, hex_digit1, multispace0, multispace1};
use nom::combinator::{consumed, map, opt, recognize};
use nom::error::{ErrorKind, ParseError};
use nom::multi::many0;
use nom::sequence::{delimited, preceded, terminated, tuple};
use nom::{Err, IResult};
use xdom_nom::{helper, name, qname, xmlchar};

// -----------------------------------------------------------------------------------------------

/// prolog element Misc*
///
/// [\[1\] document](https://www.w3.org/TR/2008/REC-xml-20081126/#NT-document)
pub fn document(input: &str) -> IResult<&str, model::Document<'_>> {
    map(
        tuple((prolog, element, many0(misc))),
        |(prolog, root, trailing)| model::Document {
            prolog,
            root,
            trailing,
        },
    )(input)
}

/// TextDecl? followed by the declarations of an external DTD subset.
///
/// [\[30\] extSubset](https://www.w3.org/TR/2008/REC-xml-20081126/#NT-extSubset)
pub fn external_subset(input: &str) -> IResult<&str, Vec<model::SubsetDecl<'_>>> {
    preceded(opt(text_decl), subset_decls)(input)
}

// -----------------------------------------------------------------------------------------------

/// XMLDecl? Misc* (doctypedecl Misc*)?
///
/// [\[22\] prolog](https://www.w3.org/TR/2008/REC-xml-20081126/#NT-prolog)
fn prolog(input: &str) -> IResult<&str, model::Prolog<'_>> {
    map(
        tuple((
            opt(xml_decl),
            many0(misc),
            opt(tuple((doctype_decl, many0(misc)))),
        )),
        |(decl, before_doctype, tail)| {
            let (doctype, after_doctype) = match tail {
                Some((doctype, miscs)) => (Some(doctype), miscs),
                None => (None, vec![]),
            };
            model::Prolog {
                decl,
                before_doctype,
                doctype,
                after_doctype,
            }
        },
    )(input)
}

/// '\<?xml' VersionInfo EncodingDecl? SDDecl? S? '?>'
///
/// [\[23\] XMLDecl](https://www.w3.org/TR/2008/REC-xml-20081126/#NT-XMLDecl)
fn xml_decl(input: &str) -> IResult<&str, model::XmlDecl<'_>> {
    map(
        delimited(
            tag("<?xml"),
            tuple((version_info, opt(encoding_decl), opt(sd_decl))),
            tuple((multispace0, tag("?>"))),
        ),
        |(version, encoding, standalone)| model::XmlDecl {
            version,
            encoding,
            standalone,
        },
    )(input)
}

/// '\<?xml' VersionInfo? EncodingDecl S? '?>'
///
/// [\[77\] TextDecl](https://www.w3.org/TR/2008/REC-xml-20081126/#NT-TextDecl)
fn text_decl(input: &str) -> IResult<&str, &str> {
    delimited(
        tag("<?xml"),
        preceded(opt(version_info), encoding_decl),
        tuple((multispace0, tag("?>"))),
    )(input)
}

/// S 'version' Eq ("'" VersionNum "'" | '"' VersionNum '"')
///
/// [\[24\] VersionInfo](https://www.w3.org/TR/2008/REC-xml-20081126/#NT-VersionInfo)
fn version_info(input: &str) -> IResult<&str, &str> {
    preceded(
        tuple((multispace1, tag("version"), eq)),
        alt((
            delimited(tag("'"), version_num, tag("'")),
            delimited(tag("\""), version_num, tag("\"")),
        )),
    )(input)
}

/// S? '=' S?
///
/// [\[25\] Eq](https://www.w3.org/TR/2008/REC-xml-20081126/#NT-Eq)
fn eq(input: &str) -> IResult<&str, &str> {
    delimited(multispace0, tag("="), multispace0)(input)
}

/// '1.' [0-9]+
///
/// [\[26\] VersionNum](https://www.w3.org/TR/2008/REC-xml-20081126/#NT-VersionNum)
fn version_num(input: &str) -> IResult<&str, &str> {
    recognize(tuple((tag("1."), digit1)))(input)
}

/// S 'standalone' Eq (("'" ('yes' | 'no') "'") | ('"' ('yes' | 'no') '"'))
///
/// [\[32\] SDDecl](https://www.w3.org/TR/2008/REC-xml-20081126/#NT-SDDecl)
fn sd_decl(input: &str) -> IResult<&str, bool> {
    map(
        preceded(
            tuple((multispace1, tag("standalone"), eq)),
            alt((
                delimited(tag("'"), alt((tag("yes"), tag("no"))), tag("'")),
                delimited(tag("\""), alt((tag("yes"), tag("no"))), tag("\"")),
            )),
        ),
        |v| v == "yes",
    )(input)
}

/// S 'encoding' Eq ('"' EncName '"' | "'" EncName "'" )
///
/// [\[80\] EncodingDecl](https://www.w3.org/TR/2008/REC-xml-20081126/#NT-EncodingDecl)
fn encoding_decl(input: &str) -> IResult<&str, &str> {
    preceded(
        tuple((multispace1, tag("encoding"), eq)),
        alt((
            delimited(tag("'"), enc_name, tag("'")),
            delimited(tag("\""), enc_name, tag("\"")),
        )),
    )(input)
}

/// \[A-Za-z] (\[A-Za-z0-9._] | '-')*
///
/// [\[81\] EncName](https://www.w3.org/TR/2008/REC-xml-20081126/#NT-EncName)
fn enc_name(input: &str) -> IResult<&str, &str> {
    recognize(tuple((alpha1, xmlchar::enc_name0)))(input)
}

/// Comment | PI | S
///
/// [\[27\] Misc](https://www.w3.org/TR/2008/REC-xml-20081126/#NT-Misc)
fn misc(input: &str) -> IResult<&str, model::Misc<'_>> {
    alt((
        map(comment, model::Misc::Comment),
        map(pi, model::Misc::Pi),
        map(multispace1, |_| model::Misc::Space),
    ))(input)
}

// -----------------------------------------------------------------------------------------------

/// '\<!--' ((Char - '-') | ('-' (Char - '-')))* '-->'
///
/// [\[15\] Comment](https://www.w3.org/TR/2008/REC-xml-20081126/#NT-Comment)
fn comment(input: &str) -> IResult<&str, &str> {
    delimited(tag("<!--"), take_to("--"), tag("-->"))(input)
}

/// '\<?' PITarget (S (Char* - (Char* '?>' Char*)))? '?>'
///
/// [\[16\] PI](https://www.w3.org/TR/2008/REC-xml-20081126/#NT-PI)
fn pi(input: &str) -> IResult<&str, model::Pi<'_>> {
    map(
        delimited(
            tag("<?"),
            tuple((pi_target, opt(preceded(multispace1, take_to("?>"))))),
            tag("?>"),
        ),
        |(target, data)| model::Pi { target, data },
    )(input)
}

/// Name - (('X' | 'x') ('M' | 'm') ('L' | 'l'))
///
/// [\[17\] PITarget](https://www.w3.org/TR/2008/REC-xml-20081126/#NT-PITarget)
fn pi_target(input: &str) -> IResult<&str, &str> {
    helper::take_unless(name, "xml")(input)
}

/// CDStart CData CDEnd
///
/// [\[18\] CDSect](https://www.w3.org/TR/2008/REC-xml-20081126/#NT-CDSect)
fn cdsect(input: &str) -> IResult<&str, &str> {
    delimited(tag("<![CDATA["), take_to("]]>"), tag("]]>"))(input)
}

/// \[^<&]* - (\[^<&]* ']]>' \[^<&]*)
///
/// [\[14\] CharData](https://www.w3.org/TR/2008/REC-xml-20081126/#NT-CharData)
fn char_data(input: &str) -> IResult<&str, &str> {
    helper::take_until_stop(xmlchar::char_except1("<&"), "]]>")(input)
}

// -----------------------------------------------------------------------------------------------

/// EmptyElemTag | STag content ETag
///
/// [\[39\] element](https://www.w3.org/TR/2008/REC-xml-20081126/#NT-element)
fn element(input: &str) -> IResult<&str, model::Element<'_>> {
    let (rest, (name, attributes, empty)) = stag(input)?;
    if empty {
        return Ok((
            rest,
            model::Element {
                name,
                attributes,
                children: vec![],
            },
        ));
    }

    let (rest, children) = content(rest)?;
    let (rest, end) = etag(rest)?;
    if end != name {
        return Err(Err::Failure(nom::error::Error::from_error_kind(
            input,
            ErrorKind::Verify,
        )));
    }

    Ok((
        rest,
        model::Element {
            name,
            attributes,
            children,
        },
    ))
}

/// '\<' Name (S Attribute)* S? ('>' | '/>')
///
/// [\[40\] STag](https://www.w3.org/TR/2008/REC-xml-20081126/#NT-STag)
///
/// [\[44\] EmptyElemTag](https://www.w3.org/TR/2008/REC-xml-20081126/#NT-EmptyElemTag)
#[allow(clippy::type_complexity)]
fn stag(input: &str) -> IResult<&str, (model::QName<'_>, Vec<model::Attribute<'_>>, bool)> {
    tuple((
        preceded(tag("<"), qname),
        many0(preceded(multispace1, attribute)),
        preceded(
            multispace0,
            alt((map(tag("/>"), |_| true), map(tag(">"), |_| false))),
        ),
    ))(input)
}

/// '\</' Name S? '>'
///
/// [\[42\] ETag](https://www.w3.org/TR/2008/REC-xml-20081126/#NT-ETag)
fn etag(input: &str) -> IResult<&str, model::QName<'_>> {
    delimited(tag("</"), qname, tuple((multispace0, tag(">"))))(input)
}

/// Name Eq AttValue
///
/// [\[41\] Attribute](https://www.w3.org/TR/2008/REC-xml-20081126/#NT-Attribute)
fn attribute(input: &str) -> IResult<&str, model::Attribute<'_>> {
    map(tuple((qname, preceded(eq, att_value))), |(name, value)| {
        model::Attribute { name, value }
    })(input)
}

/// '"' ([^<&"] | Reference)* '"' |  "'" ([^<&'] | Reference)* "'"
///
/// [\[10\] AttValue](https://www.w3.org/TR/2008/REC-xml-20081126/#NT-AttValue)
fn att_value(input: &str) -> IResult<&str, Vec<model::AttrPart<'_>>> {
    alt((
        delimited(tag("\""), many0(att_part("<&\"")), tag("\"")),
        delimited(tag("'"), many0(att_part("<&'")), tag("'")),
    ))(input)
}

fn att_part<'a>(
    except: &'static str,
) -> impl FnMut(&'a str) -> IResult<&'a str, model::AttrPart<'a>> {
    move |input| {
        alt((
            map(xmlchar::char_except1(except), model::AttrPart::Text),
            map(char_ref, model::AttrPart::CharRef),
            map(entity_ref, model::AttrPart::EntityRef),
        ))(input)
    }
}

/// CharData? ((element | Reference | CDSect | PI | Comment) CharData?)*
///
/// [\[43\] content](https://www.w3.org/TR/2008/REC-xml-20081126/#NT-content)
fn content(input: &str) -> IResult<&str, Vec<model::Content<'_>>> {
    many0(alt((
        map(char_data, model::Content::Text),
        map(cdsect, model::Content::CData),
        map(comment, model::Content::Comment),
        map(pi, model::Content::Pi),
        map(element, model::Content::Element),
        map(char_ref, model::Content::CharRef),
        map(entity_ref, model::Content::EntityRef),
    )))(input)
}

// -----------------------------------------------------------------------------------------------

/// '&#' [0-9]+ ';' | '&#x' [0-9a-fA-F]+ ';'
///
/// [\[66\] CharRef](https://www.w3.org/TR/2008/REC-xml-20081126/#NT-CharRef)
fn char_ref(input: &str) -> IResult<&str, model::CharRef<'_>> {
    alt((
        map(delimited(tag("&#x"), hex_digit1, tag(";")), |digits| {
            model::CharRef { digits, radix: 16 }
        }),
        map(delimited(tag("&#"), digit1, tag(";")), |digits| {
            model::CharRef { digits, radix: 10 }
        }),
    ))(input)
}

/// '&' Name ';'
///
/// [\[68\] EntityRef](https://www.w3.org/TR/2008/REC-xml-20081126/#NT-EntityRef)
fn entity_ref(input: &str) -> IResult<&str, &str> {
    delimited(tag("&"), name, tag(";"))(input)
}

/// '%' Name ';'
///
/// [\[69\] PEReference](https://www.w3.org/TR/2008/REC-xml-20081126/#NT-PEReference)
fn pe_reference(input: &str) -> IResult<&str, &str> {
    delimited(tag("%"), name, tag(";"))(input)
}

// -----------------------------------------------------------------------------------------------

/// '\<!DOCTYPE' S Name (S ExternalID)? S? ('[' intSubset ']' S?)? '>'
///
/// [\[28\] doctypedecl](https://www.w3.org/TR/2008/REC-xml-20081126/#NT-doctypedecl)
fn doctype_decl(input: &str) -> IResult<&str, model::Doctype<'_>> {
    map(
        tuple((
            preceded(tuple((tag("<!DOCTYPE"), multispace1)), qname),
            terminated(opt(preceded(multispace1, external_id)), multispace0),
            terminated(
                opt(delimited(
                    tag("["),
                    map(consumed(subset_decls), |(raw, decls)| model::Subset {
                        raw,
                        decls,
                    }),
                    tuple((tag("]"), multispace0)),
                )),
                tag(">"),
            ),
        )),
        |(name, external_id, subset)| model::Doctype {
            name,
            external_id,
            subset,
        },
    )(input)
}

/// (markupdecl | DeclSep)*
///
/// [\[28b\] intSubset](https://www.w3.org/TR/2008/REC-xml-20081126/#NT-intSubset)
fn subset_decls(input: &str) -> IResult<&str, Vec<model::SubsetDecl<'_>>> {
    map(
        many0(alt((
            map(multispace1, |_| None),
            map(subset_decl, Some),
        ))),
        |decls| decls.into_iter().flatten().collect(),
    )(input)
}

/// elementdecl | AttlistDecl | EntityDecl | NotationDecl | PI | Comment | PEReference
///
/// [\[29\] markupdecl](https://www.w3.org/TR/2008/REC-xml-20081126/#NT-markupdecl)
fn subset_decl(input: &str) -> IResult<&str, model::SubsetDecl<'_>> {
    alt((
        entity_decl,
        map(notation_decl, model::SubsetDecl::Notation),
        map(raw_decl("<!ELEMENT"), model::SubsetDecl::Element),
        map(raw_decl("<!ATTLIST"), model::SubsetDecl::AttList),
        map(pi, model::SubsetDecl::Pi),
        map(comment, model::SubsetDecl::Comment),
        map(pe_reference, model::SubsetDecl::PeReference),
    ))(input)
}

/// GEDecl | PEDecl
///
/// [\[70\] EntityDecl](https://www.w3.org/TR/2008/REC-xml-20081126/#NT-EntityDecl)
fn entity_decl(input: &str) -> IResult<&str, model::SubsetDecl<'_>> {
    alt((pe_decl, ge_decl))(input)
}

/// '\<!ENTITY' S Name S EntityDef S? '>'
///
/// [\[71\] GEDecl](https://www.w3.org/TR/2008/REC-xml-20081126/#NT-GEDecl)
fn ge_decl(input: &str) -> IResult<&str, model::SubsetDecl<'_>> {
    map(
        delimited(
            tuple((tag("<!ENTITY"), multispace1)),
            tuple((name, preceded(multispace1, entity_def))),
            tuple((multispace0, tag(">"))),
        ),
        |(name, def)| model::SubsetDecl::Entity(model::EntityDecl { name, def }),
    )(input)
}

/// '\<!ENTITY' S '%' S Name S PEDef S? '>'
///
/// [\[72\] PEDecl](https://www.w3.org/TR/2008/REC-xml-20081126/#NT-PEDecl)
fn pe_decl(input: &str) -> IResult<&str, model::SubsetDecl<'_>> {
    map(
        delimited(
            tuple((tag("<!ENTITY"), multispace1, tag("%"), multispace1)),
            tuple((name, preceded(multispace1, pe_def))),
            tuple((multispace0, tag(">"))),
        ),
        |(name, _)| model::SubsetDecl::ParameterEntity(name),
    )(input)
}

/// EntityValue | (ExternalID NDataDecl?)
///
/// [\[73\] EntityDef](https://www.w3.org/TR/2008/REC-xml-20081126/#NT-EntityDef)
fn entity_def(input: &str) -> IResult<&str, model::EntityDef<'_>> {
    alt((
        map(entity_value, model::EntityDef::Internal),
        map(tuple((external_id, opt(ndata_decl))), |(id, ndata)| {
            model::EntityDef::External { id, ndata }
        }),
    ))(input)
}

/// EntityValue | ExternalID
///
/// [\[74\] PEDef](https://www.w3.org/TR/2008/REC-xml-20081126/#NT-PEDef)
fn pe_def(input: &str) -> IResult<&str, ()> {
    alt((map(entity_value, |_| ()), map(external_id, |_| ())))(input)
}

/// '"' ([^%&"] | PEReference | Reference)* '"' | "'" ([^%&'] | PEReference | Reference)* "'"
///
/// [\[9\] EntityValue](https://www.w3.org/TR/2008/REC-xml-20081126/#NT-EntityValue)
fn entity_value(input: &str) -> IResult<&str, Vec<model::EntityValuePart<'_>>> {
    alt((
        delimited(tag("\""), many0(entity_value_part("%&\"")), tag("\"")),
        delimited(tag("'"), many0(entity_value_part("%&'")), tag("'")),
    ))(input)
}

fn entity_value_part<'a>(
    except: &'static str,
) -> impl FnMut(&'a str) -> IResult<&'a str, model::EntityValuePart<'a>> {
    move |input| {
        alt((
            map(xmlchar::char_except1(except), model::EntityValuePart::Text),
            map(char_ref, model::EntityValuePart::CharRef),
            map(entity_ref, model::EntityValuePart::EntityRef),
            map(pe_reference, model::EntityValuePart::PeReference),
        ))(input)
    }
}

/// S 'NDATA' S Name
///
/// [\[76\] NDataDecl](https://www.w3.org/TR/2008/REC-xml-20081126/#NT-NDataDecl)
fn ndata_decl(input: &str) -> IResult<&str, &str> {
    preceded(tuple((multispace1, tag("NDATA"), multispace1)), name)(input)
}

/// '\<!NOTATION' S Name S (ExternalID | PublicID) S? '>'
///
/// [\[82\] NotationDecl](https://www.w3.org/TR/2008/REC-xml-20081126/#NT-NotationDecl)
fn notation_decl(input: &str) -> IResult<&str, model::NotationDecl<'_>> {
    map(
        tuple((
            preceded(tuple((tag("<!NOTATION"), multispace1)), name),
            delimited(multispace1, notation_id, tuple((multispace0, tag(">")))),
        )),
        |(name, (public_id, system_id))| model::NotationDecl {
            name,
            public_id,
            system_id,
        },
    )(input)
}

#[allow(clippy::type_complexity)]
fn notation_id(input: &str) -> IResult<&str, (Option<&str>, Option<&str>)> {
    alt((
        map(external_id, |id| (id.public_id(), Some(id.system_id()))),
        map(public_id, |p| (Some(p), None)),
    ))(input)
}

/// 'SYSTEM' S SystemLiteral | 'PUBLIC' S PubidLiteral S SystemLiteral
///
/// [\[75\] ExternalID](https://www.w3.org/TR/2008/REC-xml-20081126/#NT-ExternalID)
fn external_id(input: &str) -> IResult<&str, model::ExternalId<'_>> {
    alt((
        map(
            preceded(tuple((tag("SYSTEM"), multispace1)), system_literal),
            model::ExternalId::System,
        ),
        map(
            preceded(
                tuple((tag("PUBLIC"), multispace1)),
                tuple((pubid_literal, preceded(multispace1, system_literal))),
            ),
            |(p, s)| model::ExternalId::Public(p, s),
        ),
    ))(input)
}

/// 'PUBLIC' S PubidLiteral
///
/// [\[83\] PublicID](https://www.w3.org/TR/2008/REC-xml-20081126/#NT-PublicID)
fn public_id(input: &str) -> IResult<&str, &str> {
    preceded(tuple((tag("PUBLIC"), multispace1)), pubid_literal)(input)
}

/// ('"' [^"]* '"') | ("'" [^']* "'")
///
/// [\[11\] SystemLiteral](https://www.w3.org/TR/2008/REC-xml-20081126/#NT-SystemLiteral)
fn system_literal(input: &str) -> IResult<&str, &str> {
    alt((
        delimited(tag("\""), xmlchar::char_except0("\""), tag("\"")),
        delimited(tag("'"), xmlchar::char_except0("'"), tag("'")),
    ))(input)
}

/// '"' PubidChar* '"' | "'" (PubidChar - "'")* "'"
///
/// [\[12\] PubidLiteral](https://www.w3.org/TR/2008/REC-xml-20081126/#NT-PubidLiteral)
fn pubid_literal(input: &str) -> IResult<&str, &str> {
    alt((
        delimited(tag("\""), xmlchar::pubid_char_except0("\""), tag("\"")),
        delimited(tag("'"), xmlchar::pubid_char_except0("'"), tag("'")),
    ))(input)
}

// -----------------------------------------------------------------------------------------------

/// Consumes a declaration verbatim from `open` through its closing '>',
/// honoring quoted literals.
fn raw_decl<'a>(open: &'static str) -> impl FnMut(&'a str) -> IResult<&'a str, &'a str> {
    move |input| {
        let rest = input.strip_prefix(open).ok_or_else(|| {
            Err::Error(nom::error::Error::from_error_kind(input, ErrorKind::Tag))
        })?;

        let mut quote = None;
        for (i, c) in rest.char_indices() {
            match quote {
                Some(q) => {
                    if c == q {
                        quote = None;
                    }
                }
                None => match c {
                    '"' | '\'' => quote = Some(c),
                    '>' => {
                        let end = open.len() + i + 1;
                        return Ok((&input[end..], &input[..end]));
                    }
                    _ => {}
                },
            }
        }

        Err(Err::Error(nom::error::Error::from_error_kind(
            input,
            ErrorKind::TakeUntil,
        )))
    }
}

/// Takes everything up to the first occurrence of `stop`, requiring the
/// span to consist of XML characters.
fn take_to<'a>(stop: &'static str) -> impl FnMut(&'a str) -> IResult<&'a str, &'a str> {
    move |input| match input.find(stop) {
        Some(index) => {
            let value = &input[..index];
            if value.chars().all(xmlchar::is_char) {
                Ok((&input[index..], value))
            } else {
                Err(Err::Error(nom::error::Error::from_error_kind(
                    input,
                    ErrorKind::Char,
                )))
            }
        }
        None => Err(Err::Error(nom::error::Error::from_error_kind(
            input,
            ErrorKind::TakeUntil,
        ))),
    }
}

// -----------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use model::QName;

    #[test]
    fn test_document_min() {
        let (rest, ret) = document("<root />").unwrap();
        assert_eq!("", rest);
        assert_eq!(QName::from("root"), ret.root.name);
        assert!(ret.root.children.is_empty());
        assert!(ret.prolog.decl.is_none());
    }

    #[test]
    fn test_document_decl() {
        let (rest, ret) =
            document("<?xml version='1.0' encoding='utf-8' standalone='yes'?><root/>").unwrap();
        assert_eq!("", rest);

        let decl = ret.prolog.decl.unwrap();
        assert_eq!("1.0", decl.version);
        assert_eq!(Some("utf-8"), decl.encoding);
        assert_eq!(Some(true), decl.standalone);
    }

    #[test]
    fn test_document_misc() {
        let (rest, ret) = document("<!--c1--><?p1?><!DOCTYPE root><!--c2--><root/><?p2 x?>").unwrap();
        assert_eq!("", rest);
        assert_eq!(
            vec![
                model::Misc::Comment("c1"),
                model::Misc::Pi(model::Pi {
                    target: "p1",
                    data: None
                })
            ],
            ret.prolog.before_doctype
        );
        assert_eq!(
            vec![model::Misc::Comment("c2")],
            ret.prolog.after_doctype
        );
        assert_eq!(
            vec![model::Misc::Pi(model::Pi {
                target: "p2",
                data: Some("x")
            })],
            ret.trailing
        );
    }

    #[test]
    fn test_element_content() {
        let (rest, ret) = document("<r>a<b x='1'>t</b><![CDATA[<c>]]>&amp;&#65;</r>").unwrap();
        assert_eq!("", rest);

        let children = &ret.root.children;
        assert_eq!(model::Content::Text("a"), children[0]);
        match &children[1] {
            model::Content::Element(e) => {
                assert_eq!(QName::from("b"), e.name);
                assert_eq!(QName::from("x"), e.attributes[0].name);
                assert_eq!(vec![model::AttrPart::Text("1")], e.attributes[0].value);
                assert_eq!(vec![model::Content::Text("t")], e.children);
            }
            v => panic!("unexpected content: {:?}", v),
        }
        assert_eq!(model::Content::CData("<c>"), children[2]);
        assert_eq!(model::Content::EntityRef("amp"), children[3]);
        assert_eq!(
            model::Content::CharRef(model::CharRef {
                digits: "65",
                radix: 10
            }),
            children[4]
        );
    }

    #[test]
    fn test_element_ns_names() {
        let (rest, ret) = document("<p:r xmlns:p='urn:x' p:a='v'/>").unwrap();
        assert_eq!("", rest);
        assert_eq!(QName::prefixed("p", "r"), ret.root.name);
        assert_eq!(
            QName::prefixed("xmlns", "p"),
            ret.root.attributes[0].name
        );
        assert_eq!(QName::prefixed("p", "a"), ret.root.attributes[1].name);
    }

    #[test]
    fn test_element_mismatched_etag() {
        assert!(document("<root></r>").is_err());
    }

    #[test]
    fn test_doctype_external_id() {
        let (rest, ret) =
            document("<!DOCTYPE root PUBLIC '-//X//Y//EN' 'http://example.com/x.dtd'><root/>")
                .unwrap();
        assert_eq!("", rest);

        let doctype = ret.prolog.doctype.unwrap();
        assert_eq!(QName::from("root"), doctype.name);
        assert_eq!(
            Some(model::ExternalId::Public(
                "-//X//Y//EN",
                "http://example.com/x.dtd"
            )),
            doctype.external_id
        );
        assert!(doctype.subset.is_none());
    }

    #[test]
    fn test_doctype_subset() {
        let (rest, ret) = document(
            "<!DOCTYPE root [<!NOTATION n SYSTEM 'n.bin'><!ENTITY e 'v'><!ENTITY u SYSTEM 'u.txt' NDATA n><!ELEMENT root (#PCDATA)>]><root/>",
        )
        .unwrap();
        assert_eq!("", rest);

        let subset = ret.prolog.doctype.unwrap().subset.unwrap();
        assert!(subset.raw.starts_with("<!NOTATION"));
        assert_eq!(4, subset.decls.len());
        assert_eq!(
            model::SubsetDecl::Notation(model::NotationDecl {
                name: "n",
                public_id: None,
                system_id: Some("n.bin"),
            }),
            subset.decls[0]
        );
        assert_eq!(
            model::SubsetDecl::Entity(model::EntityDecl {
                name: "e",
                def: model::EntityDef::Internal(vec![model::EntityValuePart::Text("v")]),
            }),
            subset.decls[1]
        );
        assert_eq!(
            model::SubsetDecl::Entity(model::EntityDecl {
                name: "u",
                def: model::EntityDef::External {
                    id: model::ExternalId::System("u.txt"),
                    ndata: Some("n"),
                },
            }),
            subset.decls[2]
        );
        assert_eq!(
            model::SubsetDecl::Element("<!ELEMENT root (#PCDATA)>"),
            subset.decls[3]
        );
    }

    #[test]
    fn test_subset_parameter_entity() {
        let (rest, ret) = subset_decls("<!ENTITY % p 'v'> %p;").unwrap();
        assert_eq!("", rest);
        assert_eq!(
            vec![
                model::SubsetDecl::ParameterEntity("p"),
                model::SubsetDecl::PeReference("p"),
            ],
            ret
        );
    }

    #[test]
    fn test_raw_decl_quoted() {
        let (rest, ret) = raw_decl("<!ATTLIST")("<!ATTLIST a b CDATA 'x>y'>z").unwrap();
        assert_eq!("z", rest);
        assert_eq!("<!ATTLIST a b CDATA 'x>y'>", ret);
    }

    #[test]
    fn test_external_subset() {
        let (rest, ret) =
            external_subset("<?xml encoding='utf-8'?>\n<!ENTITY e 'v'>\n").unwrap();
        assert_eq!("", rest);
        assert_eq!(1, ret.len());
    }

    #[test]
    fn test_comment_double_hyphen() {
        assert!(document("<r><!--a--b--></r>").is_err());
    }

    #[test]
    fn test_pi_target_not_xml() {
        assert!(pi("<?xml version='1.0'?>").is_err());

        let (rest, ret) = pi("<?xml-stylesheet href='a.css'?>").unwrap();
        assert_eq!("", rest);
        assert_eq!("xml-stylesheet", ret.target);
    }

    #[test]
    fn test_att_value_quotes() {
        let (rest, ret) = att_value("\"a'b\"").unwrap();
        assert_eq!("", rest);
        assert_eq!(vec![model::AttrPart::Text("a'b")], ret);

        let (rest, ret) = att_value("'a\"b'").unwrap();
        assert_eq!("", rest);
        assert_eq!(vec![model::AttrPart::Text("a\"b")], ret);
    }
}

// -----------------------------------------------------------------------------------------------
